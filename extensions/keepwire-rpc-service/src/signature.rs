use keepwire::frame::ValueType;
use xxhash_rust::xxh3::Xxh3;

/// Separates the method name from the type tags in the hashed input.
const NAME_TERMINATOR: u8 = 0xFF;

/// Deterministic id of a method overload: xxh3-64 over the method name
/// followed by the tag byte of each parameter type.
///
/// Two overloads with the same name but different parameter types get
/// different ids; the id does not depend on the interface.
///
/// ```rust
/// use keepwire::frame::ValueType;
/// use keepwire_rpc_service::method_signature_id;
///
/// let add_ints = method_signature_id("add", &[ValueType::Int, ValueType::Int]);
/// let add_floats = method_signature_id("add", &[ValueType::Float, ValueType::Float]);
/// assert_ne!(add_ints, add_floats);
/// assert_eq!(add_ints, method_signature_id("add", &[ValueType::Int, ValueType::Int]));
/// ```
pub fn method_signature_id(method_name: &str, parameter_types: &[ValueType]) -> u64 {
    let mut hasher = Xxh3::new();
    hasher.update(method_name.as_bytes());
    hasher.update(&[NAME_TERMINATOR]);
    for parameter_type in parameter_types {
        hasher.update(&[u8::from(*parameter_type)]);
    }
    hasher.digest()
}
