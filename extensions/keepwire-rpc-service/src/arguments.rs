use keepwire::frame::{Value, ValueTypeError};
use std::io;

/// Splits `arguments` into exactly `N` values.
pub fn expect_arguments<const N: usize>(arguments: Vec<Value>) -> Result<[Value; N], io::Error> {
    let count = arguments.len();
    arguments.try_into().map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("expected {} arguments, got {}", N, count),
        )
    })
}

/// Converts one value into `T`, reporting a mismatch as `InvalidData`.
pub fn decode_value<T>(value: Value) -> Result<T, io::Error>
where
    T: TryFrom<Value, Error = ValueTypeError>,
{
    T::try_from(value).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
}
