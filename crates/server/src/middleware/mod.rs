//! HTTP middleware.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, one hub per request)
//! 2. CORS
//! 3. `TraceLayer` (request span with status and latency)
//! 4. Request ID (recorded on the span, echoed in the response)
//! 5. Rate limiting, on the language model routes only

pub mod cors;
pub mod rate_limit;
pub mod request_id;

pub use cors::cors_layer;
pub use rate_limit::{RateLimiterLayer, llm_rate_limiter};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
