pub const DEFAULT_CUR_REPORT_NAME: &str = "CloudFix-CUR";
pub const BACKFILL_SUBJECT: &str = "Backfill CUR data";
pub const BILLING_SERVICE_CODE: &str = "billing";
pub const INVOICES_CATEGORY_CODE: &str = "invoices-and-reports";
pub const HIGH_SEVERITY_CODE: &str = "high";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportCaseRequest {
    pub subject: String,
    pub communication_body: String,
    pub service_code: String,
    pub category_code: String,
    pub severity_code: String,
    pub cc_email_addresses: Vec<String>,
}

impl SupportCaseRequest {
    /// Asks billing support to backfill a freshly created cost and usage
    /// report with the last three calendar months.
    pub fn cur_backfill(report_name: &str) -> Self {
        Self {
            subject: BACKFILL_SUBJECT.to_string(),
            communication_body: format!(
                "We need recently created CUR report named {report_name} to contain the data from the last 3 calendar months. Could you backfill the data for {report_name}?"
            ),
            service_code: BILLING_SERVICE_CODE.to_string(),
            category_code: INVOICES_CATEGORY_CODE.to_string(),
            severity_code: HIGH_SEVERITY_CODE.to_string(),
            cc_email_addresses: Vec::new(),
        }
    }
}
