use keepwire::frame::{RemoteFailure, Value, ValueType};
use keepwire_rpc_service::{RpcInterface, RpcMethod, method_signature_id};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Type-erased method implementation: decoded call arguments in, encoded
/// result or failure out.
pub type MethodInvoker = Arc<dyn Fn(Vec<Value>) -> Result<Value, RemoteFailure> + Send + Sync>;

#[derive(Clone)]
pub struct MethodEntry {
    name: String,
    parameter_types: Vec<ValueType>,
    invoker: MethodInvoker,
}

impl MethodEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameter_types(&self) -> &[ValueType] {
        &self.parameter_types
    }

    pub fn invoke(&self, arguments: Vec<Value>) -> Result<Value, RemoteFailure> {
        (self.invoker)(arguments)
    }
}

/// The methods one implementation exposes for one interface, keyed by
/// signature id.
///
/// A table without methods is a marker: it tags an implementation but
/// cannot be dispatched to.
pub struct InterfaceTable {
    interface_id: String,
    methods: HashMap<u64, MethodEntry>,
}

impl InterfaceTable {
    pub fn builder<I: RpcInterface>() -> InterfaceTableBuilder<I> {
        InterfaceTableBuilder {
            methods: HashMap::new(),
            _interface: PhantomData,
        }
    }

    pub fn marker(interface_id: impl Into<String>) -> Self {
        Self {
            interface_id: interface_id.into(),
            methods: HashMap::new(),
        }
    }

    pub fn interface_id(&self) -> &str {
        &self.interface_id
    }

    pub fn is_marker(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    /// Finds the overload matching `method_name` and `parameter_types`.
    pub fn find(&self, method_name: &str, parameter_types: &[ValueType]) -> Option<&MethodEntry> {
        self.methods
            .get(&method_signature_id(method_name, parameter_types))
            .filter(|entry| entry.name == method_name && entry.parameter_types == parameter_types)
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodEntry> {
        self.methods.values()
    }
}

impl fmt::Debug for InterfaceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.methods.values().map(|entry| entry.name()).collect();
        names.sort_unstable();
        f.debug_struct("InterfaceTable")
            .field("interface_id", &self.interface_id)
            .field("methods", &names)
            .finish()
    }
}

pub struct InterfaceTableBuilder<I: RpcInterface> {
    methods: HashMap<u64, MethodEntry>,
    _interface: PhantomData<fn() -> I>,
}

impl<I: RpcInterface> InterfaceTableBuilder<I> {
    /// Binds method `M` to `handler`. Registering the same signature again
    /// replaces the earlier handler.
    pub fn method<M, F>(mut self, handler: F) -> Self
    where
        M: RpcMethod<Interface = I> + 'static,
        F: Fn(M::Input) -> Result<M::Output, RemoteFailure> + Send + Sync + 'static,
    {
        let invoker: MethodInvoker = Arc::new(move |arguments: Vec<Value>| {
            let input = M::decode_arguments(arguments).map_err(|err| {
                RemoteFailure::framework(RemoteFailure::INVALID_ARGUMENTS, err.to_string())
            })?;
            let output = handler(input)?;
            M::encode_result(output).map_err(|err| {
                RemoteFailure::framework(RemoteFailure::INVALID_ARGUMENTS, err.to_string())
            })
        });

        self.methods.insert(
            M::signature_id(),
            MethodEntry {
                name: M::METHOD_NAME.to_owned(),
                parameter_types: M::PARAMETER_TYPES.to_vec(),
                invoker,
            },
        );
        self
    }

    pub fn build(self) -> InterfaceTable {
        InterfaceTable {
            interface_id: I::INTERFACE_ID.to_owned(),
            methods: self.methods,
        }
    }
}
