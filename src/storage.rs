//! Policy store: the persistence boundary the engine loads from and the
//! administration service saves through. One row per tuple; null value
//! slots round-trip as null, never as empty strings.

use sea_orm::{
    ColumnTrait, Database, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::authz::errors::AuthzError;
use crate::authz::types::PolicyTuple;
use crate::entities;
use crate::entities::policy_rule;
use crate::errors::ValorisError;
use crate::settings::Database as DbCfg;

const VALUE_COLUMNS: [policy_rule::Column; 6] = [
    policy_rule::Column::V0,
    policy_rule::Column::V1,
    policy_rule::Column::V2,
    policy_rule::Column::V3,
    policy_rule::Column::V4,
    policy_rule::Column::V5,
];

pub async fn init(cfg: &DbCfg) -> Result<DatabaseConnection, ValorisError> {
    let db = Database::connect(&cfg.url).await?;
    Ok(db)
}

/// All rows in id (insertion) order. The order carries no semantics but
/// stays stable so listings and fixtures are reproducible.
pub async fn load_all(db: &DatabaseConnection) -> Result<Vec<PolicyTuple>, AuthzError> {
    let rows = entities::PolicyRule::find()
        .order_by_asc(policy_rule::Column::Id)
        .all(db)
        .await?;
    rows.into_iter().map(tuple_from_row).collect()
}

/// Append one tuple.
pub async fn insert(db: &DatabaseConnection, tuple: &PolicyTuple) -> Result<(), AuthzError> {
    entities::PolicyRule::insert(active_model(tuple))
        .exec(db)
        .await?;
    Ok(())
}

/// Wipe the table. Only bulk save/replace flows use this.
pub async fn delete_all(db: &DatabaseConnection) -> Result<(), AuthzError> {
    entities::PolicyRule::delete_many().exec(db).await?;
    Ok(())
}

/// Delete rows matching `ptype` and the provided leading field values in
/// positional order (v0, v1, ...). Fewer values constrain fewer columns, so
/// `delete_matching(db, "p", &["CLIENT"])` removes every CLIENT rule.
pub async fn delete_matching(
    db: &DatabaseConnection,
    ptype: &str,
    fields: &[&str],
) -> Result<(), AuthzError> {
    if fields.len() > VALUE_COLUMNS.len() {
        return Err(AuthzError::InvalidRule(format!(
            "at most {} field values are supported, got {}",
            VALUE_COLUMNS.len(),
            fields.len()
        )));
    }
    let mut query = entities::PolicyRule::delete_many()
        .filter(policy_rule::Column::Ptype.eq(ptype));
    for (column, value) in VALUE_COLUMNS.iter().zip(fields) {
        query = query.filter(column.eq(*value));
    }
    query.exec(db).await?;
    Ok(())
}

/// Delete rows whose field at `field_index` matches any of `values`. An
/// empty value list deletes every row of that ptype: an administrator
/// invoking a filtered delete with no values wants a full wipe of the type.
pub async fn delete_filtered(
    db: &DatabaseConnection,
    ptype: &str,
    field_index: usize,
    values: &[&str],
) -> Result<(), AuthzError> {
    let mut query = entities::PolicyRule::delete_many()
        .filter(policy_rule::Column::Ptype.eq(ptype));
    if !values.is_empty() {
        let column = VALUE_COLUMNS.get(field_index).ok_or_else(|| {
            AuthzError::InvalidRule(format!("field index {field_index} out of range"))
        })?;
        query = query.filter(column.is_in(values.iter().copied()));
    }
    query.exec(db).await?;
    Ok(())
}

/// Replace the whole table with the given tuples, transactionally.
pub async fn save_all(db: &DatabaseConnection, tuples: &[PolicyTuple]) -> Result<(), AuthzError> {
    let txn = db.begin().await?;
    entities::PolicyRule::delete_many().exec(&txn).await?;
    for tuple in tuples {
        entities::PolicyRule::insert(active_model(tuple))
            .exec(&txn)
            .await?;
    }
    txn.commit().await?;
    Ok(())
}

fn active_model(tuple: &PolicyTuple) -> policy_rule::ActiveModel {
    policy_rule::ActiveModel {
        ptype: Set(tuple.ptype.clone()),
        v0: Set(Some(tuple.subject.clone())),
        v1: Set(Some(tuple.resource.clone())),
        v2: Set(Some(tuple.action.clone())),
        v3: Set(tuple.extra[0].clone()),
        v4: Set(tuple.extra[1].clone()),
        v5: Set(tuple.extra[2].clone()),
        ..Default::default()
    }
}

fn tuple_from_row(row: policy_rule::Model) -> Result<PolicyTuple, AuthzError> {
    let id = row.id;
    let missing = |slot: &str| {
        AuthzError::InvalidRule(format!("row {id} has a null {slot} slot"))
    };
    Ok(PolicyTuple {
        ptype: row.ptype,
        subject: row.v0.ok_or_else(|| missing("v0"))?,
        resource: row.v1.ok_or_else(|| missing("v1"))?,
        action: row.v2.ok_or_else(|| missing("v2"))?,
        extra: [row.v3, row.v4, row.v5],
    })
}
