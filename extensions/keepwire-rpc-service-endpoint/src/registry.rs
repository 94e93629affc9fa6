use crate::InterfaceTable;
use arc_swap::ArcSwap;
use keepwire::ConfigurationError;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, Mutex, PoisonError};

/// An object that implements one or more service interfaces.
pub trait RpcEndpoint: Send + Sync + 'static {
    /// Every interface this implementation exposes, markers included.
    fn interfaces(self: Arc<Self>) -> Vec<InterfaceTable>;

    /// Used in registration errors.
    fn endpoint_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

type TableMap = HashMap<String, Arc<InterfaceTable>>;

/// Interface id → implementation map.
///
/// Lookups read an immutable snapshot without locking. Registrations copy the
/// map, insert, and swap the new snapshot in while holding a writer lock.
#[derive(Debug, Default)]
pub struct EndpointRegistry {
    tables: ArcSwap<TableMap>,
    writer: Mutex<()>,
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the single non-marker interface `endpoint` exposes.
    pub fn register_endpoint<E: RpcEndpoint>(
        &self,
        endpoint: Arc<E>,
    ) -> Result<(), ConfigurationError> {
        let name = endpoint.endpoint_name();
        let mut tables: Vec<InterfaceTable> = endpoint
            .interfaces()
            .into_iter()
            .filter(|table| !table.is_marker())
            .collect();

        match tables.pop() {
            None => Err(ConfigurationError::NoInterface(name.to_owned())),
            Some(_) if !tables.is_empty() => {
                Err(ConfigurationError::MultipleInterfaces(name.to_owned()))
            }
            Some(table) => self.register_interface(table),
        }
    }

    /// Registers `table` under its interface id.
    pub fn register_interface(&self, table: InterfaceTable) -> Result<(), ConfigurationError> {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let mut next: TableMap = HashMap::clone(&self.tables.load());
        match next.entry(table.interface_id().to_owned()) {
            Entry::Occupied(entry) => Err(ConfigurationError::AlreadyRegistered(entry.key().clone())),
            Entry::Vacant(entry) => {
                tracing::debug!(
                    "registering interface {} with {} methods",
                    table.interface_id(),
                    table.method_count()
                );
                entry.insert(Arc::new(table));
                self.tables.store(Arc::new(next));
                Ok(())
            }
        }
    }

    pub fn lookup(&self, interface_id: &str) -> Option<Arc<InterfaceTable>> {
        self.tables.load().get(interface_id).cloned()
    }

    pub fn is_registered(&self, interface_id: &str) -> bool {
        self.tables.load().contains_key(interface_id)
    }

    pub fn interface_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.tables.load().keys().cloned().collect();
        ids.sort_unstable();
        ids
    }
}
