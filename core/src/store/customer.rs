use super::CustomerStore;
use crate::{customer::CustomerRecord, error::RetentionResult};
use rusqlite::{params, OptionalExtension, Row};

const CUSTOMER_COLUMNS: &str = "customer_id, gender, senior_citizen, partner, dependents,
    tenure_months, phone_service, multiple_lines, internet_service, online_security,
    online_backup, device_protection, tech_support, streaming_tv, streaming_movies,
    paperless_billing, payment_method, monthly_charges, total_charges, churned,
    contract, status, churn_risk_score, cancel_intent";

impl CustomerStore {
    // ── Customer ──────────────────────────────────────────────────

    /// Insert or replace the row for `c.customer_id`.
    pub fn upsert_customer(&self, c: &CustomerRecord) -> RetentionResult<()> {
        self.conn.execute(
            &format!(
                "INSERT OR REPLACE INTO customer ({CUSTOMER_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                         ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24)"
            ),
            params![
                &c.customer_id,
                &c.gender,
                c.senior_citizen,
                c.partner,
                c.dependents,
                c.tenure_months,
                &c.phone_service,
                &c.multiple_lines,
                &c.internet_service,
                &c.online_security,
                &c.online_backup,
                &c.device_protection,
                &c.tech_support,
                &c.streaming_tv,
                &c.streaming_movies,
                c.paperless_billing,
                &c.payment_method,
                c.monthly_charges,
                c.total_charges,
                c.churned,
                &c.contract,
                &c.status,
                c.churn_risk_score,
                c.cancel_intent,
            ],
        )?;
        Ok(())
    }

    pub fn get_customer(&self, customer_id: &str) -> RetentionResult<Option<CustomerRecord>> {
        let record = self
            .conn
            .query_row(
                &format!("SELECT {CUSTOMER_COLUMNS} FROM customer WHERE customer_id = ?1"),
                params![customer_id],
                customer_from_row,
            )
            .optional()?;
        Ok(record)
    }

    pub fn customer_count(&self) -> RetentionResult<i64> {
        let n = self
            .conn
            .query_row("SELECT COUNT(*) FROM customer", [], |row| row.get(0))?;
        Ok(n)
    }

    /// Active customers, riskiest first.
    pub fn riskiest_customers(&self, limit: usize) -> RetentionResult<Vec<CustomerRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customer
             WHERE status = 'active'
             ORDER BY churn_risk_score DESC, customer_id ASC
             LIMIT ?1"
        ))?;
        let rows = stmt.query_map(params![limit as i64], customer_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

fn customer_from_row(row: &Row<'_>) -> rusqlite::Result<CustomerRecord> {
    Ok(CustomerRecord {
        customer_id:       row.get(0)?,
        gender:            row.get(1)?,
        senior_citizen:    row.get(2)?,
        partner:           row.get(3)?,
        dependents:        row.get(4)?,
        tenure_months:     row.get(5)?,
        phone_service:     row.get(6)?,
        multiple_lines:    row.get(7)?,
        internet_service:  row.get(8)?,
        online_security:   row.get(9)?,
        online_backup:     row.get(10)?,
        device_protection: row.get(11)?,
        tech_support:      row.get(12)?,
        streaming_tv:      row.get(13)?,
        streaming_movies:  row.get(14)?,
        paperless_billing: row.get(15)?,
        payment_method:    row.get(16)?,
        monthly_charges:   row.get(17)?,
        total_charges:     row.get(18)?,
        churned:           row.get(19)?,
        contract:          row.get(20)?,
        status:            row.get(21)?,
        churn_risk_score:  row.get(22)?,
        cancel_intent:     row.get(23)?,
    })
}
