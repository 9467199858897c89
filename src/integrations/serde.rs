//! `serde` representations of the wire-facing types.

use std::fmt;

use serde::{
    de,
    ser::{self, SerializeMap as _},
};

use crate::{
    ast::InputValue,
    executor::{ExecutionError, PathSegment, Response},
    span::SourcePosition,
    validation::RuleError,
    value::Value,
};

impl ser::Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Int(i) => serializer.serialize_i32(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::List(l) => l.serialize(serializer),
            Value::Object(o) => {
                let mut map = serializer.serialize_map(Some(o.field_count()))?;
                for (k, v) in o.iter() {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl ser::Serialize for SourcePosition {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        // One-based on the wire.
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("line", &(self.line() + 1))?;
        map.serialize_entry("column", &(self.column() + 1))?;
        map.end()
    }
}

impl ser::Serialize for PathSegment {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        match self {
            PathSegment::Field(name) => serializer.serialize_str(name),
            PathSegment::Index(index) => serializer.serialize_u64(*index as u64),
        }
    }
}

impl ser::Serialize for ExecutionError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        let mut map = serializer.serialize_map(None)?;

        map.serialize_entry("message", self.error().message())?;
        map.serialize_entry("locations", &[self.location()])?;
        if !self.path().is_empty() {
            map.serialize_entry("path", self.path())?;
        }
        if !self.error().extensions().is_null() {
            map.serialize_entry("extensions", self.error().extensions())?;
        }

        map.end()
    }
}

impl ser::Serialize for RuleError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("message", self.message())?;
        map.serialize_entry("locations", self.locations())?;
        map.end()
    }
}

impl ser::Serialize for Response {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        if let Some(data) = &self.data {
            map.serialize_entry("data", data)?;
        }
        if !self.errors.is_empty() {
            map.serialize_entry("errors", &self.errors)?;
        }
        map.end()
    }
}

impl<'de> de::Deserialize<'de> for InputValue {
    fn deserialize<D>(deserializer: D) -> Result<InputValue, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        struct InputValueVisitor;

        impl<'de> de::Visitor<'de> for InputValueVisitor {
            type Value = InputValue;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a valid input value")
            }

            fn visit_bool<E>(self, value: bool) -> Result<InputValue, E> {
                Ok(InputValue::Boolean(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<InputValue, E>
            where
                E: de::Error,
            {
                // Large integers arrive without a decimal point and must
                // fall back to floating point rather than error.
                Ok(i32::try_from(value)
                    .map_or_else(|_| InputValue::Float(value as f64), InputValue::Int))
            }

            fn visit_u64<E>(self, value: u64) -> Result<InputValue, E>
            where
                E: de::Error,
            {
                if value <= i32::MAX as u64 {
                    self.visit_i64(value as i64)
                } else {
                    Ok(InputValue::Float(value as f64))
                }
            }

            fn visit_f64<E>(self, value: f64) -> Result<InputValue, E> {
                Ok(InputValue::Float(value))
            }

            fn visit_str<E>(self, value: &str) -> Result<InputValue, E>
            where
                E: de::Error,
            {
                self.visit_string(value.into())
            }

            fn visit_string<E>(self, value: String) -> Result<InputValue, E> {
                Ok(InputValue::String(value))
            }

            fn visit_none<E>(self) -> Result<InputValue, E> {
                Ok(InputValue::null())
            }

            fn visit_unit<E>(self) -> Result<InputValue, E> {
                Ok(InputValue::null())
            }

            fn visit_seq<V>(self, mut visitor: V) -> Result<InputValue, V::Error>
            where
                V: de::SeqAccess<'de>,
            {
                let mut values = Vec::new();
                while let Some(el) = visitor.next_element()? {
                    values.push(el);
                }
                Ok(InputValue::list(values))
            }

            fn visit_map<V>(self, mut visitor: V) -> Result<InputValue, V::Error>
            where
                V: de::MapAccess<'de>,
            {
                let mut object = Vec::with_capacity(visitor.size_hint().unwrap_or(0));
                while let Some(entry) = visitor.next_entry::<String, InputValue>()? {
                    object.push(entry);
                }
                Ok(InputValue::object(object))
            }
        }

        deserializer.deserialize_any(InputValueVisitor)
    }
}

impl ser::Serialize for InputValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        match self {
            InputValue::Null | InputValue::Variable(..) => serializer.serialize_unit(),
            InputValue::Int(i) => serializer.serialize_i32(*i),
            InputValue::Float(f) => serializer.serialize_f64(*f),
            InputValue::Boolean(b) => serializer.serialize_bool(*b),
            InputValue::String(s) | InputValue::Enum(s) => serializer.serialize_str(s),
            InputValue::List(l) => l
                .iter()
                .map(|v| &v.item)
                .collect::<Vec<_>>()
                .serialize(serializer),
            InputValue::Object(o) => {
                let mut map = serializer.serialize_map(Some(o.len()))?;
                for (k, v) in o {
                    map.serialize_entry(&k.item, &v.item)?;
                }
                map.end()
            }
        }
    }
}
