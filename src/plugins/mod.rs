//! BICS API plugins
//!
//! Each plugin implements `ApiPlugin` from `crate::plugin`.

mod address;
mod cdr;
mod connect;
mod disconnection;
mod emergency;
mod my_numbers;
mod porting;
mod sms;

pub use address::MyNumbersAddressManagementApiPlugin;
pub use cdr::MyNumbersCdrApiPlugin;
pub use connect::ConnectApiPlugin;
pub use disconnection::MyNumbersDisconnectionApiPlugin;
pub use emergency::MyNumbersEmergencyServicesApiPlugin;
pub use my_numbers::MyNumbersApiPlugin;
pub use porting::MyNumbersNumberPortingApiPlugin;
pub use sms::SmsApiPlugin;

use crate::error::PluginError;
use crate::http::PluginContext;
use crate::plugin::ApiPlugin;
use std::sync::Arc;

/// Build all eight plugins in registration order. Fails on the first error.
pub fn create_all(ctx: &PluginContext) -> Result<Vec<Arc<dyn ApiPlugin>>, PluginError> {
    Ok(vec![
        Arc::new(ConnectApiPlugin::new(ctx)?),
        Arc::new(MyNumbersApiPlugin::new(ctx)?),
        Arc::new(MyNumbersAddressManagementApiPlugin::new(ctx)?),
        Arc::new(MyNumbersCdrApiPlugin::new(ctx)?),
        Arc::new(MyNumbersDisconnectionApiPlugin::new(ctx)?),
        Arc::new(MyNumbersEmergencyServicesApiPlugin::new(ctx)?),
        Arc::new(MyNumbersNumberPortingApiPlugin::new(ctx)?),
        Arc::new(SmsApiPlugin::new(ctx)?),
    ])
}
