//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When the
//! migrations change, regenerate with `diesel print-schema` or edit by hand.

diesel::table! {
    /// Registered accounts. `email` is unique.
    users (id) {
        id -> Uuid,
        email -> Varchar,
        name -> Varchar,
        /// Argon2 PHC string.
        password_hash -> Text,
        is_active -> Bool,
        is_staff -> Bool,
        is_superuser -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Issued API tokens, keyed by the SHA-256 digest of the key.
    auth_tokens (digest) {
        digest -> Varchar,
        user_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Contracts. Unique on `(user_id, name_folded)`.
    contracts (id) {
        id -> Uuid,
        /// Insertion order; newest contracts list first.
        seq -> Int8,
        user_id -> Uuid,
        name -> Varchar,
        name_folded -> Text,
        description -> Text,
        /// Bounded to 1..=3 by a check constraint.
        level -> Int2,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    gardens (id) {
        id -> Int8,
        user_id -> Uuid,
        name -> Varchar,
        level -> Int2,
    }
}

diesel::table! {
    /// Plants and their telemetry readings.
    plants (id) {
        id -> Int8,
        garden_id -> Int8,
        user_id -> Uuid,
        name -> Varchar,
        soil_moisture -> Int4,
        fertilizer_rate -> Int4,
        height -> Int4,
        stem_count -> Int4,
        health_score -> Int4,
        is_present -> Bool,
        soil_cohesion -> Int4,
        disease_index -> Int4,
        insect_density -> Int4,
    }
}

diesel::table! {
    /// Links a contract to the gardens created by its cascade.
    contract_gardens (contract_id, garden_id) {
        contract_id -> Uuid,
        garden_id -> Int8,
    }
}

diesel::table! {
    /// Links a garden to its plants.
    garden_plants (garden_id, plant_id) {
        garden_id -> Int8,
        plant_id -> Int8,
    }
}

diesel::joinable!(auth_tokens -> users (user_id));
diesel::joinable!(contracts -> users (user_id));
diesel::joinable!(gardens -> users (user_id));
diesel::joinable!(contract_gardens -> contracts (contract_id));
diesel::joinable!(contract_gardens -> gardens (garden_id));
diesel::joinable!(garden_plants -> plants (plant_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    auth_tokens,
    contracts,
    gardens,
    plants,
    contract_gardens,
    garden_plants,
);
