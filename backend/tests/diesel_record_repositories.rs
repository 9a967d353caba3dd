//! Integration tests for the Diesel record repositories against PostgreSQL.
//!
//! Each test seeds its own users so tests can share one database.

mod common;

use backend::domain::ports::{
    ContractRepository, ContractRepositoryError, GardenFilter, GardenRepository, PlantRepository,
};
use backend::domain::{
    ContractPlan, GardenChanges, Level, NewContract, PlantChanges, RecordName, TelemetryChanges,
    UserId,
};
use backend::outbound::persistence::{
    DieselContractRepository, DieselGardenRepository, DieselPlantRepository,
};
use rstest::rstest;

use common::{database, seed_user};

fn plan(owner: &UserId, name: &str, level: i64) -> ContractPlan {
    ContractPlan::build(
        owner.clone(),
        NewContract {
            name: RecordName::new(name).expect("valid name"),
            description: "integration".to_owned(),
            level: Level::new(level).expect("valid level"),
        },
    )
}

#[rstest]
#[case(1)]
#[case(2)]
#[tokio::test]
async fn cascade_writes_every_garden_and_plant(#[case] level: i64) {
    let Some(pool) = database().await else { return };
    let owner = seed_user(&pool).await;
    let contracts = DieselContractRepository::new(pool.clone());
    let fan_out = usize::try_from(level * 10).expect("small");

    let contract = contracts
        .create_with_cascade(&plan(owner.id(), "Orchard", level))
        .await
        .expect("cascade commits");

    assert_eq!(contract.gardens.len(), fan_out);
    for garden in &contract.gardens {
        assert_eq!(garden.plants.len(), fan_out);
        assert!(garden.plants.iter().all(|plant| plant.garden_id == garden.id));
    }
    let stored = contracts
        .find_for_owner(owner.id(), &contract.id)
        .await
        .expect("query")
        .expect("contract present");
    assert_eq!(stored.gardens, contract.gardens);
}

#[tokio::test]
async fn names_are_unique_per_owner_ignoring_case() {
    let Some(pool) = database().await else { return };
    let owner = seed_user(&pool).await;
    let neighbour = seed_user(&pool).await;
    let contracts = DieselContractRepository::new(pool.clone());
    contracts
        .create_with_cascade(&plan(owner.id(), "Orchard", 1))
        .await
        .expect("first insert");

    let folded = RecordName::new("ORCHARD").expect("valid name");
    assert!(contracts.name_exists(owner.id(), &folded).await.expect("query"));
    assert!(!contracts.name_exists(neighbour.id(), &folded).await.expect("query"));

    let err = contracts
        .create_with_cascade(&plan(owner.id(), "oRcHaRd", 1))
        .await
        .expect_err("duplicate rejected");
    assert!(matches!(err, ContractRepositoryError::DuplicateName { .. }));

    let gardens = DieselGardenRepository::new(pool);
    let owned = gardens
        .list_for_owner(owner.id(), &GardenFilter::default())
        .await
        .expect("list");
    assert_eq!(owned.len(), 10, "failed cascade must not leave gardens");
}

#[rstest]
#[case("Äpfel", "äpfel")]
#[case("ΟΣ", "ος")]
#[tokio::test]
async fn non_ascii_names_fold_like_the_domain(#[case] stored: &str, #[case] variant: &str) {
    let Some(pool) = database().await else { return };
    let owner = seed_user(&pool).await;
    let contracts = DieselContractRepository::new(pool);
    contracts
        .create_with_cascade(&plan(owner.id(), stored, 1))
        .await
        .expect("first insert");

    let folded = RecordName::new(variant).expect("valid name");
    assert!(contracts.name_exists(owner.id(), &folded).await.expect("query"));
    let err = contracts
        .create_with_cascade(&plan(owner.id(), variant, 1))
        .await
        .expect_err("duplicate rejected");
    assert!(matches!(err, ContractRepositoryError::DuplicateName { .. }));
}

#[tokio::test]
async fn contracts_list_in_creation_order_newest_first() {
    let Some(pool) = database().await else { return };
    let owner = seed_user(&pool).await;
    let contracts = DieselContractRepository::new(pool);
    for name in ["first", "second", "third"] {
        contracts
            .create_with_cascade(&plan(owner.id(), name, 1))
            .await
            .expect("cascade commits");
    }

    let names: Vec<String> = contracts
        .list_for_owner(owner.id())
        .await
        .expect("list")
        .into_iter()
        .map(|contract| contract.name.as_ref().to_owned())
        .collect();
    assert_eq!(names, ["third", "second", "first"]);
}

#[tokio::test]
async fn records_are_invisible_to_other_users() {
    let Some(pool) = database().await else { return };
    let owner = seed_user(&pool).await;
    let intruder = seed_user(&pool).await;
    let contracts = DieselContractRepository::new(pool.clone());
    let gardens = DieselGardenRepository::new(pool.clone());
    let plants = DieselPlantRepository::new(pool);
    let contract = contracts
        .create_with_cascade(&plan(owner.id(), "Private", 1))
        .await
        .expect("cascade commits");
    let garden = contract.gardens.first().expect("garden");
    let plant = garden.plants.first().expect("plant");

    assert!(contracts.list_for_owner(intruder.id()).await.expect("list").is_empty());
    assert!(contracts
        .find_for_owner(intruder.id(), &contract.id)
        .await
        .expect("query")
        .is_none());
    assert!(gardens
        .find_for_owner(intruder.id(), garden.id)
        .await
        .expect("query")
        .is_none());
    assert!(plants
        .update_for_owner(intruder.id(), plant.id, &PlantChanges::default())
        .await
        .expect("query")
        .is_none());
    assert!(!plants
        .delete_for_owner(intruder.id(), plant.id)
        .await
        .expect("query"));
    assert!(!contracts
        .delete_for_owner(intruder.id(), &contract.id)
        .await
        .expect("query"));
}

#[tokio::test]
async fn gardens_filter_and_sort_by_name() {
    let Some(pool) = database().await else { return };
    let owner = seed_user(&pool).await;
    let contracts = DieselContractRepository::new(pool.clone());
    for name in ["Apple", "Rose_bed", "Rosemary"] {
        contracts
            .create_with_cascade(&plan(owner.id(), name, 1))
            .await
            .expect("cascade commits");
    }
    let gardens = DieselGardenRepository::new(pool);

    let all = gardens
        .list_for_owner(owner.id(), &GardenFilter::default())
        .await
        .expect("list");
    assert_eq!(all.len(), 30);
    assert_eq!(all.first().map(|g| g.name.as_ref()), Some("Rosemary"));
    assert_eq!(all.last().map(|g| g.name.as_ref()), Some("Apple"));

    let underscored = gardens
        .list_for_owner(
            owner.id(),
            &GardenFilter {
                name_contains: Some("E_B".to_owned()),
            },
        )
        .await
        .expect("list");
    assert_eq!(underscored.len(), 10);
    assert!(underscored.iter().all(|g| g.name.as_ref() == "Rose_bed"));
}

#[tokio::test]
async fn garden_updates_and_deletes_cascade_to_plants() {
    let Some(pool) = database().await else { return };
    let owner = seed_user(&pool).await;
    let contracts = DieselContractRepository::new(pool.clone());
    let contract = contracts
        .create_with_cascade(&plan(owner.id(), "Border", 1))
        .await
        .expect("cascade commits");
    let gardens = DieselGardenRepository::new(pool.clone());
    let plants = DieselPlantRepository::new(pool);
    let garden = contract.gardens.first().expect("garden");

    let unchanged = gardens
        .update_for_owner(owner.id(), garden.id, &GardenChanges::default())
        .await
        .expect("query")
        .expect("garden present");
    assert_eq!(&unchanged, garden);

    let renamed = gardens
        .update_for_owner(
            owner.id(),
            garden.id,
            &GardenChanges {
                name: Some(RecordName::new("Hedge").expect("valid name")),
                level: Some(Level::new(3).expect("valid level")),
            },
        )
        .await
        .expect("query")
        .expect("garden present");
    assert_eq!(renamed.name.as_ref(), "Hedge");
    assert_eq!(renamed.level.get(), 3);
    assert_eq!(renamed.plants.len(), 10);

    assert!(gardens.delete_for_owner(owner.id(), garden.id).await.expect("delete"));
    assert_eq!(plants.list_for_owner(owner.id()).await.expect("list").len(), 90);
}

#[tokio::test]
async fn contract_delete_keeps_gardens_and_plant_updates_persist() {
    let Some(pool) = database().await else { return };
    let owner = seed_user(&pool).await;
    let contracts = DieselContractRepository::new(pool.clone());
    let contract = contracts
        .create_with_cascade(&plan(owner.id(), "Meadow", 1))
        .await
        .expect("cascade commits");
    let plants = DieselPlantRepository::new(pool.clone());
    let plant_id = contract.gardens[0].plants[0].id;

    let updated = plants
        .update_for_owner(
            owner.id(),
            plant_id,
            &PlantChanges {
                name: None,
                telemetry: TelemetryChanges {
                    soil_moisture: Some(55),
                    is_present: Some(false),
                    ..TelemetryChanges::default()
                },
            },
        )
        .await
        .expect("query")
        .expect("plant present");
    assert_eq!(updated.telemetry.soil_moisture, 55);
    assert!(!updated.telemetry.is_present);

    assert!(contracts
        .delete_for_owner(owner.id(), &contract.id)
        .await
        .expect("delete"));
    let gardens = DieselGardenRepository::new(pool);
    let remaining = gardens
        .list_for_owner(owner.id(), &GardenFilter::default())
        .await
        .expect("list");
    assert_eq!(remaining.len(), 10);
    assert_eq!(plants.list_for_owner(owner.id()).await.expect("list").len(), 100);
}
