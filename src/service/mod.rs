pub mod dispatcher;
pub mod executor;
pub mod request;
pub mod run_state;
pub mod transport;

pub use dispatcher::WebServiceDispatcher;
pub use executor::ServiceExecutor;
pub use request::{ServiceCompletion, ServiceRequest, execute_request};
pub use run_state::ServiceRunState;
pub use transport::{HttpTransport, TransportError, UreqTransport};
