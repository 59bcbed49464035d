//! Avro Schema Model
//!
//! Parse `.avsc` (JSON) ke tree `Node` yang langsung dipakai codec.
//! Subset yang didukung: primitive, enum, record, union, plus logical
//! type `uuid` dan `timestamp-millis`.
//!
//! Identitas schema = canonical form (JSON compact, key terurut), jadi
//! perbedaan whitespace tidak menghasilkan schema baru di registry.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value as Json;

use crate::model::WireValue;

/// Error saat parsing schema
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("failed to read schema file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("schema is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported schema type `{0}`")]
    Unsupported(String),
    #[error("unknown type reference `{0}`")]
    UnknownType(String),
    #[error("invalid schema: {0}")]
    Invalid(String),
}

/// Satu node dalam schema tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    String,
    /// `string` dengan logicalType `uuid`
    Uuid,
    /// `long` dengan logicalType `timestamp-millis`
    TimestampMillis,
    Enum(EnumNode),
    Record(RecordNode),
    Union(Vec<Node>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumNode {
    pub name: String,
    pub symbols: Vec<String>,
}

impl EnumNode {
    #[inline]
    pub fn index_of(&self, symbol: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordNode {
    pub name: String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub node: Node,
    /// Default value dari `.avsc`, dipakai saat field tidak ada di mapping
    pub default: Option<WireValue>,
}

impl Node {
    /// Nama tipe untuk pesan error
    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Boolean => "boolean",
            Node::Int => "int",
            Node::Long => "long",
            Node::Float => "float",
            Node::Double => "double",
            Node::String => "string",
            Node::Uuid => "uuid",
            Node::TimestampMillis => "timestamp-millis",
            Node::Enum(_) => "enum",
            Node::Record(_) => "record",
            Node::Union(_) => "union",
        }
    }
}

/// Parsed schema beserta canonical form-nya
#[derive(Debug, Clone)]
pub struct Schema {
    root: Node,
    canonical: String,
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for Schema {}

impl Schema {
    /// Parse schema dari teks JSON
    pub fn parse_str(text: &str) -> Result<Self, SchemaError> {
        let json: Json = serde_json::from_str(text)?;
        let mut names = HashMap::new();
        let root = parse_node(&json, None, &mut names)?;
        let canonical = serde_json::to_string(&json)?;
        Ok(Self { root, canonical })
    }

    /// Load schema dari file `.avsc`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_str(&text)
    }

    #[inline]
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Canonical JSON form (identitas schema di registry)
    #[inline]
    pub fn canonical_form(&self) -> &str {
        &self.canonical
    }
}

fn primitive(name: &str) -> Option<Node> {
    match name {
        "null" => Some(Node::Null),
        "boolean" => Some(Node::Boolean),
        "int" => Some(Node::Int),
        "long" => Some(Node::Long),
        "float" => Some(Node::Float),
        "double" => Some(Node::Double),
        "string" => Some(Node::String),
        _ => None,
    }
}

fn full_name(name: &str, namespace: Option<&str>) -> String {
    match namespace {
        Some(ns) if !ns.is_empty() && !name.contains('.') => format!("{ns}.{name}"),
        _ => name.to_string(),
    }
}

fn parse_node(
    json: &Json,
    namespace: Option<&str>,
    names: &mut HashMap<String, Node>,
) -> Result<Node, SchemaError> {
    match json {
        Json::String(name) => {
            if let Some(node) = primitive(name) {
                return Ok(node);
            }
            names
                .get(&full_name(name, namespace))
                .or_else(|| names.get(name.as_str()))
                .cloned()
                .ok_or_else(|| SchemaError::UnknownType(name.clone()))
        }
        Json::Array(branches) => {
            let nodes = branches
                .iter()
                .map(|b| parse_node(b, namespace, names))
                .collect::<Result<Vec<_>, _>>()?;
            if nodes.iter().any(|n| matches!(n, Node::Union(_))) {
                return Err(SchemaError::Invalid("unions may not nest".into()));
            }
            Ok(Node::Union(nodes))
        }
        Json::Object(map) => match map.get("type") {
            Some(Json::String(ty)) => match ty.as_str() {
                "record" | "error" => parse_record(map, namespace, names),
                "enum" => parse_enum(map, namespace, names),
                "bytes" | "fixed" | "array" | "map" => Err(SchemaError::Unsupported(ty.clone())),
                other => {
                    let logical = map.get("logicalType").and_then(Json::as_str);
                    match (other, logical) {
                        ("string", Some("uuid")) => Ok(Node::Uuid),
                        ("long", Some("timestamp-millis")) => Ok(Node::TimestampMillis),
                        // Logical type lain jatuh ke tipe dasarnya
                        _ => parse_node(&Json::String(other.to_string()), namespace, names),
                    }
                }
            },
            Some(nested) => parse_node(nested, namespace, names),
            None => Err(SchemaError::Invalid("object schema without `type`".into())),
        },
        other => Err(SchemaError::Invalid(format!("unexpected schema value {other}"))),
    }
}

fn required_str<'a>(map: &'a serde_json::Map<String, Json>, key: &str) -> Result<&'a str, SchemaError> {
    map.get(key)
        .and_then(Json::as_str)
        .ok_or_else(|| SchemaError::Invalid(format!("missing string attribute `{key}`")))
}

fn parse_record(
    map: &serde_json::Map<String, Json>,
    namespace: Option<&str>,
    names: &mut HashMap<String, Node>,
) -> Result<Node, SchemaError> {
    let name = required_str(map, "name")?;
    let own_ns = map.get("namespace").and_then(Json::as_str).or(namespace);
    let fields_json = map
        .get("fields")
        .and_then(Json::as_array)
        .ok_or_else(|| SchemaError::Invalid(format!("record `{name}` has no `fields` array")))?;

    let mut fields = Vec::with_capacity(fields_json.len());
    for field in fields_json {
        let field = field
            .as_object()
            .ok_or_else(|| SchemaError::Invalid(format!("record `{name}` field is not an object")))?;
        let field_name = required_str(field, "name")?;
        let field_type = field
            .get("type")
            .ok_or_else(|| SchemaError::Invalid(format!("field `{field_name}` has no `type`")))?;
        let node = parse_node(field_type, own_ns, names)?;
        let default = match field.get("default") {
            Some(json) => Some(default_value(&node, json).ok_or_else(|| {
                SchemaError::Invalid(format!("default of `{field_name}` does not match its type"))
            })?),
            None => None,
        };
        fields.push(Field {
            name: field_name.to_string(),
            node,
            default,
        });
    }

    let node = Node::Record(RecordNode {
        name: name.to_string(),
        fields,
    });
    names.insert(full_name(name, own_ns), node.clone());
    names.insert(name.to_string(), node.clone());
    Ok(node)
}

fn parse_enum(
    map: &serde_json::Map<String, Json>,
    namespace: Option<&str>,
    names: &mut HashMap<String, Node>,
) -> Result<Node, SchemaError> {
    let name = required_str(map, "name")?;
    let own_ns = map.get("namespace").and_then(Json::as_str).or(namespace);
    let symbols = map
        .get("symbols")
        .and_then(Json::as_array)
        .ok_or_else(|| SchemaError::Invalid(format!("enum `{name}` has no `symbols` array")))?
        .iter()
        .map(|s| {
            s.as_str()
                .map(str::to_string)
                .ok_or_else(|| SchemaError::Invalid(format!("enum `{name}` symbol is not a string")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if symbols.is_empty() {
        return Err(SchemaError::Invalid(format!("enum `{name}` has no symbols")));
    }

    let node = Node::Enum(EnumNode {
        name: name.to_string(),
        symbols,
    });
    names.insert(full_name(name, own_ns), node.clone());
    names.insert(name.to_string(), node.clone());
    Ok(node)
}

/// Konversi JSON default ke `WireValue` sesuai node.
/// Default untuk union selalu mengikuti branch pertama.
fn default_value(node: &Node, json: &Json) -> Option<WireValue> {
    match (node, json) {
        (Node::Null, Json::Null) => Some(WireValue::Null),
        (Node::Boolean, Json::Bool(b)) => Some(WireValue::Boolean(*b)),
        (Node::Int | Node::Long | Node::TimestampMillis, Json::Number(n)) => {
            n.as_i64().map(WireValue::Long)
        }
        (Node::Float | Node::Double, Json::Number(n)) => n.as_f64().map(WireValue::Double),
        (Node::String | Node::Uuid, Json::String(s)) => Some(WireValue::String(s.clone())),
        (Node::Enum(e), Json::String(s)) => e.index_of(s).map(|_| WireValue::String(s.clone())),
        (Node::Record(r), Json::Object(obj)) => {
            let mut fields = BTreeMap::new();
            for field in &r.fields {
                let value = match obj.get(&field.name) {
                    Some(v) => default_value(&field.node, v)?,
                    None => field.default.clone()?,
                };
                fields.insert(field.name.clone(), value);
            }
            Some(WireValue::Record(fields))
        }
        (Node::Union(branches), json) => branches.first().and_then(|b| default_value(b, json)),
        _ => None,
    }
}
