use regauth::extract::{ForwardedRegistryAccess, RegistryAccess};
use tracing::info;

//--------------------------------------------------------------------------------------------------
// Handlers
//--------------------------------------------------------------------------------------------------

// All the checks happen in the extractors, which answer 401 themselves on denial
pub async fn handler(access: RegistryAccess) -> &'static str {
    info!("Registry access granted to {}", access.username);
    "OK"
}

pub async fn forwarded_handler(access: ForwardedRegistryAccess) -> &'static str {
    info!("Forwarded registry access granted to {}", access.username);
    "OK"
}

//--------------------------------------------------------------------------------------------------
