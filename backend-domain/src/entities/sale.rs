// Sale entity
// One line of a sales transaction as read from the external store

use anyhow::anyhow;
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use clickhouse::Row;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleRecord {
    pub sold_at: NaiveDateTime,
    pub price: Decimal,
    pub quantity: i64,
    pub payment_mode: String,
    pub branch: String,
    pub brand: String,
    pub model: String,
    pub size: String,
    pub sku: String,
}

impl SaleRecord {
    pub fn date(&self) -> NaiveDate {
        self.sold_at.date()
    }

    pub fn hour(&self) -> u32 {
        self.sold_at.hour()
    }

    /// SKU when present, otherwise the brand/model/size description.
    pub fn product_key(&self) -> String {
        let sku = self.sku.trim();
        if !sku.is_empty() {
            return sku.to_string();
        }
        [self.brand.trim(), self.model.trim(), self.size.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Row)]
pub struct SaleRow {
    #[serde(with = "clickhouse::serde::time::datetime64::millis")]
    pub sold_at: OffsetDateTime,
    pub price: f64,
    pub quantity: i64,
    pub payment_mode: String,
    pub branch: String,
    pub brand: String,
    pub model: String,
    pub size: String,
    pub sku: String,
}

impl TryFrom<SaleRow> for SaleRecord {
    type Error = anyhow::Error;

    fn try_from(row: SaleRow) -> Result<Self, Self::Error> {
        let sold_at = wall_clock(row.sold_at)
            .ok_or_else(|| anyhow!("sale timestamp {} is out of range", row.sold_at))?;
        let price = Decimal::from_f64_retain(row.price)
            .map(|value| value.round_dp(2))
            .ok_or_else(|| anyhow!("sale price {} at {} is not a number", row.price, sold_at))?;
        Ok(Self {
            sold_at,
            price,
            quantity: row.quantity,
            payment_mode: row.payment_mode,
            branch: row.branch,
            brand: row.brand,
            model: row.model,
            size: row.size,
            sku: row.sku,
        })
    }
}

/// Date and time as written in the value's own offset.
fn wall_clock(at: OffsetDateTime) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(at.year(), u32::from(u8::from(at.month())), u32::from(at.day()))?
        .and_hms_milli_opt(
            u32::from(at.hour()),
            u32::from(at.minute()),
            u32::from(at.second()),
            u32::from(at.millisecond()),
        )
}
