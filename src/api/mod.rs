/*!
 * HTTP interface of the service.
 *
 * - `types`: Request and response bodies, shared state
 * - `handlers`: One handler per route, input validation
 * - `error`: Error to status code mapping, `{"detail": ...}` bodies
 * - `server`: Router, CORS and the serving loop
 */

pub use self::error::ApiError;
pub use self::server::{create_router, serve};
pub use self::types::ApiState;

pub mod error;
pub mod handlers;
pub mod server;
pub mod types;
