//! Keyed registry of email services, built once at startup

use super::service::{EmailSender, EmailService};
use super::smtp::LettreTransportFactory;
use super::transport::TransportFactory;
use crate::domain::EmailServiceOptions;
use crate::error::{EmailError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Resolves email services by key
///
/// Every call for a key returns a handle to the same shared service. Dropping
/// a handle is all a caller does with it; the registry keeps the service
/// alive and releases its transport when the registry itself is dropped.
pub trait EmailServiceFactory: Send + Sync {
    fn create(&self, service_key: &str) -> Result<Arc<dyn EmailSender>>;
}

/// Owns one [`EmailService`] per registered configuration key
///
/// Callers receive shared handles; the registry keeps every service alive
/// for its own lifetime.
pub struct EmailServiceRegistry {
    transport_factory: Arc<dyn TransportFactory>,
    services: HashMap<String, Arc<EmailService>>,
}

impl EmailServiceRegistry {
    pub fn new(transport_factory: Arc<dyn TransportFactory>) -> Self {
        Self {
            transport_factory,
            services: HashMap::new(),
        }
    }

    /// Registry whose services talk SMTP through lettre
    pub fn with_lettre() -> Self {
        Self::new(Arc::new(LettreTransportFactory))
    }

    /// Register one service per configuration.
    ///
    /// Configurations with a blank key are skipped. A key that is already
    /// registered is replaced by the later configuration.
    pub fn register(&mut self, configurations: &[EmailServiceOptions]) -> &mut Self {
        for options in configurations {
            if options.service_key.trim().is_empty() {
                warn!(
                    smtp_server = %options.smtp_server,
                    "Skipping email service configuration without a service key"
                );
                continue;
            }

            let service_key = options.service_key.clone();
            let service = EmailService::new(options.clone(), self.transport_factory.create());

            if self
                .services
                .insert(service_key.clone(), Arc::new(service))
                .is_some()
            {
                warn!(service_key = %service_key, "Replaced previously registered email service");
            }

            info!(
                service_key = %service_key,
                smtp_server = %options.smtp_server,
                security = options.security.as_str(),
                "Registered email service"
            );
        }

        self
    }

    /// Look up the service registered under `service_key`
    pub fn resolve(&self, service_key: &str) -> Result<Arc<EmailService>> {
        self.services
            .get(service_key)
            .cloned()
            .ok_or_else(|| EmailError::ServiceNotFound(service_key.to_string()))
    }

    pub fn contains(&self, service_key: &str) -> bool {
        self.services.contains_key(service_key)
    }

    /// Registered keys, sorted
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.services.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl EmailServiceFactory for EmailServiceRegistry {
    fn create(&self, service_key: &str) -> Result<Arc<dyn EmailSender>> {
        let service: Arc<dyn EmailSender> = self.resolve(service_key)?;
        Ok(service)
    }
}
