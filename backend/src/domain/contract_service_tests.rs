//! Tests for the contract service.

use std::sync::Arc;

use chrono::Utc;
use rstest::rstest;

use super::*;
use crate::domain::ports::MockContractRepository;
use crate::domain::{ErrorCode, Level, RecordName};

fn request(name: &str, level: i64) -> NewContract {
    NewContract {
        name: RecordName::new(name).expect("valid name"),
        description: String::new(),
        level: Level::new(level).expect("valid level"),
    }
}

fn materialise(plan: &ContractPlan) -> Contract {
    Contract {
        id: plan.id,
        owner: plan.owner.clone(),
        name: plan.name.clone(),
        description: plan.description.clone(),
        level: plan.level,
        created_at: Utc::now(),
        gardens: Vec::new(),
    }
}

#[tokio::test]
async fn create_applies_full_cascade_plan() {
    let owner = UserId::random();
    let expected_owner = owner.clone();
    let mut repo = MockContractRepository::new();
    repo.expect_name_exists().returning(|_, _| Ok(false));
    repo.expect_create_with_cascade()
        .withf(move |plan| {
            plan.owner == expected_owner
                && plan.gardens.len() == 20
                && plan.gardens.iter().all(|garden| garden.plants.len() == 20)
        })
        .times(1)
        .returning(|plan| Ok(materialise(plan)));

    let contract = ContractService::new(Arc::new(repo))
        .create(&owner, request("new contract", 2))
        .await
        .expect("contract created");

    assert_eq!(contract.name.as_ref(), "new contract");
    assert_eq!(contract.owner, owner);
}

#[tokio::test]
async fn create_rejects_existing_name_before_writing() {
    let mut repo = MockContractRepository::new();
    repo.expect_name_exists()
        .withf(|_, name| name.as_ref() == "New Contract")
        .returning(|_, _| Ok(true));
    repo.expect_create_with_cascade().times(0);

    let error = ContractService::new(Arc::new(repo))
        .create(&UserId::random(), request("New Contract", 1))
        .await
        .expect_err("duplicate");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.errors()[0], DUPLICATE_CONTRACT_MESSAGE);
}

#[tokio::test]
async fn create_maps_storage_unique_violation_to_duplicate() {
    let mut repo = MockContractRepository::new();
    repo.expect_name_exists().returning(|_, _| Ok(false));
    repo.expect_create_with_cascade()
        .returning(|_| Err(ContractRepositoryError::duplicate_name("new contract")));

    let error = ContractService::new(Arc::new(repo))
        .create(&UserId::random(), request("new contract", 1))
        .await
        .expect_err("duplicate");

    assert_eq!(error.errors()[0], DUPLICATE_CONTRACT_MESSAGE);
}

#[rstest]
#[case(ContractRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case(ContractRepositoryError::query("syntax"), ErrorCode::InternalError)]
#[tokio::test]
async fn create_maps_repository_failures(
    #[case] failure: ContractRepositoryError,
    #[case] expected: ErrorCode,
) {
    let mut repo = MockContractRepository::new();
    repo.expect_name_exists().returning(|_, _| Ok(false));
    repo.expect_create_with_cascade()
        .return_once(move |_| Err(failure));

    let error = ContractService::new(Arc::new(repo))
        .create(&UserId::random(), request("new contract", 1))
        .await
        .expect_err("failure");

    assert_eq!(error.code(), expected);
}

#[rstest]
#[case(true, None)]
#[case(false, Some(ErrorCode::NotFound))]
#[tokio::test]
async fn delete_reports_missing_contracts_as_not_found(
    #[case] removed: bool,
    #[case] expected: Option<ErrorCode>,
) {
    let mut repo = MockContractRepository::new();
    repo.expect_delete_for_owner()
        .times(1)
        .returning(move |_, _| Ok(removed));

    let result = ContractService::new(Arc::new(repo))
        .delete(&UserId::random(), &ContractId::random())
        .await;

    assert_eq!(result.err().map(|err| err.code()), expected);
}

#[tokio::test]
async fn get_of_foreign_contract_is_not_found() {
    let mut repo = MockContractRepository::new();
    repo.expect_find_for_owner().returning(|_, _| Ok(None));

    let error = ContractService::new(Arc::new(repo))
        .get(&UserId::random(), &ContractId::random())
        .await
        .expect_err("not owned");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.message(), NOT_FOUND_MESSAGE);
}
