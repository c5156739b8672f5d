//! SurrealDB implementation of [`DonationRepository`].

use bloodlink_core::error::BloodlinkResult;
use bloodlink_core::models::blood_group::BloodGroup;
use bloodlink_core::models::donation::{CreateDonation, Donation, InventoryLevel};
use bloodlink_core::repository::DonationRepository;
use chrono::{DateTime, NaiveDate, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{decode, decode_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct DonationRow {
    record_id: String,
    donor: String,
    blood_group: String,
    quantity: u32,
    date: String,
    blood_bank: String,
    notes: String,
    timestamp: DateTime<Utc>,
}

impl DonationRow {
    fn try_into_donation(self) -> Result<Donation, DbError> {
        let date = self
            .date
            .parse::<NaiveDate>()
            .map_err(|e| DbError::Decode(format!("date: {e}")))?;
        Ok(Donation {
            id: decode_uuid(&self.record_id)?,
            donor: self.donor,
            blood_group: decode::<BloodGroup>(&self.blood_group, "blood_group")?,
            quantity: self.quantity,
            date,
            blood_bank: self.blood_bank,
            notes: self.notes,
            timestamp: self.timestamp,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct InventoryRow {
    blood_group: String,
    quantity: u64,
}

impl InventoryRow {
    fn try_into_level(self) -> Result<InventoryLevel, DbError> {
        Ok(InventoryLevel {
            blood_group: decode::<BloodGroup>(&self.blood_group, "blood_group")?,
            quantity: self.quantity,
        })
    }
}

/// SurrealDB implementation of the Donation repository, including the
/// per-group inventory counters.
pub struct SurrealDonationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> Clone for SurrealDonationRepository<C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

impl<C: Connection> SurrealDonationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn select_donations(
        &self,
        filter: Option<(&'static str, String)>,
    ) -> Result<Vec<Donation>, DbError> {
        let mut query = String::from("SELECT meta::id(id) AS record_id, * FROM donation");
        if let Some((column, _)) = &filter {
            query.push_str(&format!(" WHERE {column} = $value"));
        }
        query.push_str(" ORDER BY timestamp ASC");

        let mut builder = self.db.query(query);
        if let Some((_, value)) = filter {
            builder = builder.bind(("value", value));
        }

        let mut result = builder.await?;
        let rows: Vec<DonationRow> = result.take(0)?;
        rows.into_iter().map(DonationRow::try_into_donation).collect()
    }
}

impl<C: Connection> DonationRepository for SurrealDonationRepository<C> {
    async fn create(&self, input: CreateDonation) -> BloodlinkResult<Donation> {
        let id_str = Uuid::new_v4().to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('donation', $id) SET \
                 donor = $donor, blood_group = $blood_group, \
                 quantity = $quantity, date = $date, \
                 blood_bank = $blood_bank, notes = $notes; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('donation', $id);",
            )
            .bind(("id", id_str.clone()))
            .bind(("donor", input.donor))
            .bind(("blood_group", input.blood_group.as_str().to_string()))
            .bind(("quantity", input.quantity))
            .bind(("date", input.date.to_string()))
            .bind(("blood_bank", input.blood_bank))
            .bind(("notes", input.notes))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<DonationRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "donation".into(),
            id: id_str,
        })?;

        Ok(row.try_into_donation()?)
    }

    async fn list_by_donor(&self, donor: &str) -> BloodlinkResult<Vec<Donation>> {
        Ok(self
            .select_donations(Some(("donor", donor.to_string())))
            .await?)
    }

    async fn list(&self) -> BloodlinkResult<Vec<Donation>> {
        Ok(self.select_donations(None).await?)
    }

    async fn increment_inventory(
        &self,
        blood_group: BloodGroup,
        quantity: u32,
    ) -> BloodlinkResult<InventoryLevel> {
        let result = self
            .db
            .query(
                "UPSERT type::record('inventory', $slug) SET \
                 blood_group = $blood_group, \
                 quantity = (quantity ?? 0) + $quantity",
            )
            .bind(("slug", blood_group.slug().to_string()))
            .bind(("blood_group", blood_group.as_str().to_string()))
            .bind(("quantity", quantity))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<InventoryRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "inventory".into(),
            id: blood_group.slug().into(),
        })?;

        Ok(row.try_into_level()?)
    }

    async fn inventory(&self) -> BloodlinkResult<Vec<InventoryLevel>> {
        let mut result = self
            .db
            .query("SELECT blood_group, quantity FROM inventory")
            .await
            .map_err(DbError::from)?;

        let rows: Vec<InventoryRow> = result.take(0).map_err(DbError::from)?;
        let stored = rows
            .into_iter()
            .map(InventoryRow::try_into_level)
            .collect::<Result<Vec<_>, DbError>>()?;

        // Present every group, in canonical order, even if a counter row
        // is missing.
        let levels = BloodGroup::ALL
            .into_iter()
            .map(|group| {
                stored
                    .iter()
                    .find(|level| level.blood_group == group)
                    .copied()
                    .unwrap_or(InventoryLevel {
                        blood_group: group,
                        quantity: 0,
                    })
            })
            .collect();
        Ok(levels)
    }
}
