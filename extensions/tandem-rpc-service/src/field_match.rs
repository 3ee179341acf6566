//! Case-insensitive struct-field matching over a decoded JSON tree.
//!
//! [`FieldMatchDeserializer`] walks a `serde_json::Value` and behaves like
//! the plain `Value` deserializer everywhere except `deserialize_struct`:
//! there, an incoming member name with no exact match among the target's
//! declared fields is re-matched ignoring ASCII case. The tolerance is
//! scoped to struct members only. Dictionary-shaped data such as a
//! `HashMap` target or a pass-through `Value` goes through `deserialize_map`
//! / `deserialize_any` and keeps its keys byte for byte.

use serde::de::value::StringDeserializer;
use serde::de::{
    self, DeserializeSeed, Deserializer, EnumAccess, IntoDeserializer, MapAccess, SeqAccess,
    VariantAccess, Visitor,
};
use serde::forward_to_deserialize_any;
use serde_json::{Map, Value};

pub(crate) struct FieldMatchDeserializer {
    value: Value,
}

impl FieldMatchDeserializer {
    pub(crate) fn new(value: Value) -> Self {
        Self { value }
    }
}

/// Exact member names win; the fold only catches names that would otherwise
/// miss entirely.
fn match_field_name(name: String, fields: &'static [&'static str]) -> String {
    if fields.iter().any(|field| *field == name.as_str()) {
        return name;
    }
    for field in fields {
        if field.eq_ignore_ascii_case(name.as_str()) {
            return (*field).to_string();
        }
    }
    name
}

impl<'de> Deserializer<'de> for FieldMatchDeserializer {
    type Error = serde_json::Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    visitor.visit_u64(u)
                } else if let Some(i) = n.as_i64() {
                    visitor.visit_i64(i)
                } else if let Some(f) = n.as_f64() {
                    visitor.visit_f64(f)
                } else {
                    Err(de::Error::custom("number is out of range"))
                }
            }
            Value::String(s) => visitor.visit_string(s),
            Value::Array(items) => visitor.visit_seq(SeqMembers::new(items)),
            Value::Object(members) => visitor.visit_map(ObjectMembers::new(members, None)),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Object(members) => visitor.visit_map(ObjectMembers::new(members, Some(fields))),
            Value::Array(items) => visitor.visit_seq(SeqMembers::new(items)),
            other => Self::new(other).deserialize_any(visitor),
        }
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::String(tag) => visitor.visit_enum(EnumMember {
                tag,
                payload: None,
            }),
            Value::Object(members) => {
                let mut entries = members.into_iter();
                let Some((tag, payload)) = entries.next() else {
                    return Err(de::Error::custom("expected an enum variant, got an empty map"));
                };
                if entries.next().is_some() {
                    return Err(de::Error::custom(
                        "expected a single-member map for an enum variant",
                    ));
                }
                visitor.visit_enum(EnumMember {
                    tag,
                    payload: Some(payload),
                })
            }
            _ => Err(de::Error::custom("expected a string or map enum variant")),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map identifier
        ignored_any
    }
}

/// Object members in insertion order. When `fields` is set, the object is
/// feeding a struct and member names get the case-insensitive re-match; a
/// plain map target leaves names alone.
struct ObjectMembers {
    entries: serde_json::map::IntoIter,
    fields: Option<&'static [&'static str]>,
    pending: Option<Value>,
}

impl ObjectMembers {
    fn new(members: Map<String, Value>, fields: Option<&'static [&'static str]>) -> Self {
        Self {
            entries: members.into_iter(),
            fields,
            pending: None,
        }
    }
}

impl<'de> MapAccess<'de> for ObjectMembers {
    type Error = serde_json::Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: DeserializeSeed<'de>,
    {
        match self.entries.next() {
            Some((name, value)) => {
                self.pending = Some(value);
                let name = match self.fields {
                    Some(fields) => match_field_name(name, fields),
                    None => name,
                };
                seed.deserialize(name.into_deserializer()).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: DeserializeSeed<'de>,
    {
        let value = self
            .pending
            .take()
            .ok_or_else(|| de::Error::custom("member value requested before its name"))?;
        seed.deserialize(FieldMatchDeserializer::new(value))
    }
}

struct SeqMembers {
    items: std::vec::IntoIter<Value>,
}

impl SeqMembers {
    fn new(items: Vec<Value>) -> Self {
        Self {
            items: items.into_iter(),
        }
    }
}

impl<'de> SeqAccess<'de> for SeqMembers {
    type Error = serde_json::Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Self::Error>
    where
        T: DeserializeSeed<'de>,
    {
        match self.items.next() {
            Some(value) => seed
                .deserialize(FieldMatchDeserializer::new(value))
                .map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.items.len())
    }
}

struct EnumMember {
    tag: String,
    payload: Option<Value>,
}

impl<'de> EnumAccess<'de> for EnumMember {
    type Error = serde_json::Error;
    type Variant = VariantPayload;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant), Self::Error>
    where
        V: DeserializeSeed<'de>,
    {
        let tag: StringDeserializer<serde_json::Error> = self.tag.into_deserializer();
        let value = seed.deserialize(tag)?;
        Ok((
            value,
            VariantPayload {
                payload: self.payload,
            },
        ))
    }
}

struct VariantPayload {
    payload: Option<Value>,
}

impl<'de> VariantAccess<'de> for VariantPayload {
    type Error = serde_json::Error;

    fn unit_variant(self) -> Result<(), Self::Error> {
        match self.payload {
            None | Some(Value::Null) => Ok(()),
            Some(_) => Err(de::Error::custom("unexpected payload for a unit variant")),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value, Self::Error>
    where
        T: DeserializeSeed<'de>,
    {
        match self.payload {
            Some(value) => seed.deserialize(FieldMatchDeserializer::new(value)),
            None => Err(de::Error::custom("missing payload for a newtype variant")),
        }
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.payload {
            Some(value) => FieldMatchDeserializer::new(value).deserialize_any(visitor),
            None => Err(de::Error::custom("missing payload for a tuple variant")),
        }
    }

    fn struct_variant<V>(
        self,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.payload {
            Some(value) => FieldMatchDeserializer::new(value).deserialize_struct("", fields, visitor),
            None => Err(de::Error::custom("missing payload for a struct variant")),
        }
    }
}
