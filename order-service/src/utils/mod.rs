pub mod time;
pub mod validation;

pub use time::{flexible_time, format_gateway_time, parse_gateway_time, GATEWAY_TIME_FORMAT};
pub use validation::ValidatedJson;
