use stack_hooks_core::support::SupportCaseRequest;

pub trait SupportCaseFiler {
    /// Returns the id of the opened case.
    fn create_case(&self, request: &SupportCaseRequest) -> Result<String, String>;
}
