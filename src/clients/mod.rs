//! Cloneable client handles for the actors. Thin wrappers around message
//! channels; orchestration that spans actors lives here or in the order
//! service, never in the callers.

/// Generate client methods with oneshot channel boilerplate and automatic
/// tracing.
macro_rules! client_method {
    ($client:ty => fn $method:ident($($param:ident: $param_type:ty),*) -> $return_type:ty as $request:ident::$variant:ident, Error = $error_type:ty) => {
        impl $client {
            #[tracing::instrument(skip(self))]
            pub async fn $method(&self, $($param: $param_type),*) -> Result<$return_type, $error_type> {
                tracing::debug!("Sending request");
                let (respond_to, response) = tokio::sync::oneshot::channel();
                self.sender.send($request::$variant {
                    $($param,)*
                    respond_to,
                }).await.map_err(|_| <$error_type>::ActorCommunicationError("Actor closed".to_string()))?;

                response.await.map_err(|_| <$error_type>::ActorCommunicationError("Actor dropped".to_string()))?
            }
        }
    };
}

pub(crate) use client_method;

pub mod catalog_client;
pub mod directory_client;
pub mod order_client;

pub use catalog_client::CatalogClient;
pub use directory_client::DirectoryClient;
pub use order_client::OrderClient;
