// Controller-defined services (scenes / macros) that can be triggered by name.

use tracing::debug;

use crate::client::SmartIfClient;
use crate::error::Error;

impl SmartIfClient {
    /// List the names of all services.
    ///
    /// `GET Services`
    pub async fn list_services(&self) -> Result<Vec<String>, Error> {
        let url = self.endpoint(&["Services"], &[])?;
        self.get_json(url).await
    }

    /// Trigger a service by its controller-side name.
    ///
    /// `POST Services/{name}/Call`
    pub async fn call_service(&self, name: &str) -> Result<(), Error> {
        let url = self.endpoint(&["Services", name, "Call"], &[])?;
        debug!(name, "calling service");
        self.post(url).await
    }
}

/// Derive a command-friendly identifier from a service name.
///
/// Lowercases, maps whitespace to `_`, and drops anything that is not an
/// ASCII alphanumeric, `_` or `-`. `"Good Night"` becomes `good_night`.
pub fn service_slug(name: &str) -> String {
    name.trim()
        .chars()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some('_')
            } else if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                Some(c.to_ascii_lowercase())
            } else {
                None
            }
        })
        .collect()
}
