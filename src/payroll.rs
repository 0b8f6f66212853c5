use serde::{Deserialize, Serialize};

use crate::store::{Collection, Record, RecordId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayrollStatus {
    Paid,
    Pending,
}

/// One month's pay slip. `net_pay` is whatever the store holds; it is never
/// recomputed from the other amounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollRecord {
    pub id: RecordId,
    #[serde(alias = "userId")]
    pub account_id: RecordId,
    pub month: String,
    #[serde(default)]
    pub basic_salary: f64,
    #[serde(default)]
    pub bonus: f64,
    #[serde(default)]
    pub deductions: f64,
    pub net_pay: f64,
    pub status: PayrollStatus,
    #[serde(default)]
    pub pay_date: String,
}

impl Record for PayrollRecord {
    const COLLECTION: Collection = Collection::Payroll;

    fn id(&self) -> &RecordId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_net_pay_is_kept_verbatim() {
        let json = r#"{"id": 1, "userId": 2, "month": "2025-08", "basicSalary": 5000,
            "bonus": 500, "deductions": 200, "netPay": 9999, "status": "paid", "payDate": "2025-08-31"}"#;
        let slip: PayrollRecord = serde_json::from_str(json).unwrap();
        assert_eq!(slip.net_pay, 9999.0);
        assert_eq!(slip.account_id, RecordId::Int(2));
        assert_eq!(slip.status, PayrollStatus::Paid);
    }
}
