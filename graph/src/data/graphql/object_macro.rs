use crate::prelude::r;

/// Creates an `r::Value::Object` from key/value pairs, keeping their order.
/// If you don't need to determine which keys are included dynamically at runtime
/// consider using the `object! {}` macro instead.
pub fn object_value(data: Vec<(&str, r::Value)>) -> r::Value {
    r::Value::Object(
        data.into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
    )
}

pub trait IntoValue {
    fn into_value(self) -> r::Value;
}

impl IntoValue for r::Value {
    #[inline]
    fn into_value(self) -> r::Value {
        self
    }
}

impl IntoValue for &'_ str {
    #[inline]
    fn into_value(self) -> r::Value {
        self.to_owned().into_value()
    }
}

impl IntoValue for i32 {
    #[inline]
    fn into_value(self) -> r::Value {
        r::Value::Int(self as i64)
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    #[inline]
    fn into_value(self) -> r::Value {
        match self {
            Some(v) => v.into_value(),
            None => r::Value::Null,
        }
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    #[inline]
    fn into_value(self) -> r::Value {
        r::Value::List(self.into_iter().map(|e| e.into_value()).collect::<Vec<_>>())
    }
}

macro_rules! impl_into_values {
    ($(($T:ty, $V:ident)),*) => {
        $(
            impl IntoValue for $T {
                #[inline]
                fn into_value(self) -> r::Value {
                    r::Value::$V(self)
                }
            }
        )+
    };
}

impl_into_values![(String, String), (f64, Float), (bool, Boolean), (i64, Int)];

/// Creates an `r::Value::Object` from key/value pairs.
#[macro_export]
macro_rules! object {
    ($($name:ident: $value:expr,)*) => {
        {
            let mut result = $crate::prelude::r::Object::new();
            $(
                let value = $crate::data::graphql::object_macro::IntoValue::into_value($value);
                result.insert(stringify!($name).to_string(), value);
            )*
            $crate::prelude::r::Value::Object(result)
        }
    };
    ($($name:ident: $value:expr),*) => {
        $crate::object! {$($name: $value,)*}
    };
}
