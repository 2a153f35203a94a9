use crate::error::NodeDataError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The declared shape of a node type: its parameters and output ports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSchema {
    pub label: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Vec<ParameterSchema>,
    #[serde(default)]
    pub outputs: Vec<OutputSchema>,
}

/// A single configurable parameter of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSchema {
    pub id: String,
    #[serde(default)]
    pub label: String,
    /// Raw type name as authored in the template (`string`, `number`, `boolean`, `enum`, ...).
    #[serde(rename = "type")]
    pub type_name: String,
    /// Default literal value.
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub can_connect: bool,
    /// Allowed choices for `enum` parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
}

/// An output port declared by a node schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSchema {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default)]
    pub type_name: String,
}

/// The checked interpretation of a parameter's `type_name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    String,
    Number,
    Boolean,
    Enum,
    /// Template-defined type with no built-in check.
    Open,
}

impl ParameterSchema {
    pub fn kind(&self) -> ParameterKind {
        match self.type_name.as_str() {
            "string" => ParameterKind::String,
            "number" => ParameterKind::Number,
            "boolean" => ParameterKind::Boolean,
            "enum" => ParameterKind::Enum,
            _ => ParameterKind::Open,
        }
    }

    /// Whether `value` is acceptable for this parameter. `null` clears a value and is always accepted.
    pub fn accepts(&self, value: &Value) -> bool {
        if value.is_null() {
            return true;
        }
        match self.kind() {
            ParameterKind::String => value.is_string(),
            ParameterKind::Number => value.is_number(),
            ParameterKind::Boolean => value.is_boolean(),
            ParameterKind::Enum => match (value.as_str(), &self.values) {
                (Some(choice), Some(choices)) => choices.iter().any(|c| c == choice),
                (Some(_), None) => true,
                (None, _) => false,
            },
            ParameterKind::Open => true,
        }
    }
}

/// Parameter bag carried by every node.
///
/// When a [`NodeSchema`] is present, writes through [`NodeData::validate`] are checked
/// against it; schema-less nodes accept any values. Keys the engine does not know about
/// are kept verbatim in `extra` so template-defined nodes round-trip unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<NodeSchema>,
    #[serde(default)]
    pub values: Map<String, Value>,
    /// Parameters fed by an incoming edge instead of a literal value.
    #[serde(default)]
    pub connected_params: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NodeData {
    pub fn with_schema(schema: NodeSchema) -> Self {
        Self {
            schema: Some(schema),
            ..Self::default()
        }
    }

    pub fn parameter(&self, id: &str) -> Option<&ParameterSchema> {
        self.schema
            .as_ref()
            .and_then(|s| s.parameters.iter().find(|p| p.id == id))
    }

    /// Current value of a parameter, falling back to the schema default.
    pub fn value(&self, id: &str) -> Option<&Value> {
        self.values
            .get(id)
            .or_else(|| self.parameter(id).map(|p| &p.value))
    }

    /// Whether a parameter is linked to an incoming edge.
    pub fn is_linked(&self, id: &str) -> bool {
        self.connected_params
            .get(id)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Checks values and linked parameters against the schema, if there is one.
    pub fn validate(&self, node_id: &str) -> Result<(), NodeDataError> {
        if self.schema.is_none() {
            return Ok(());
        }
        for (id, value) in &self.values {
            self.check_value(node_id, id, value)?;
        }
        for (id, linked) in &self.connected_params {
            self.check_link(node_id, id, linked)?;
        }
        Ok(())
    }

    /// Like [`validate`](Self::validate), but only for entries that differ from `previous`.
    /// Entries carried over unchanged are not re-checked, so data that predates a schema
    /// change stays editable.
    pub fn validate_changes(&self, node_id: &str, previous: &NodeData) -> Result<(), NodeDataError> {
        if self.schema.is_none() {
            return Ok(());
        }
        for (id, value) in self
            .values
            .iter()
            .filter(|&(id, value)| previous.values.get(id) != Some(value))
        {
            self.check_value(node_id, id, value)?;
        }
        for (id, linked) in self
            .connected_params
            .iter()
            .filter(|&(id, linked)| previous.connected_params.get(id) != Some(linked))
        {
            self.check_link(node_id, id, linked)?;
        }
        Ok(())
    }

    /// Returns a copy with `partial` shallow-merged over the top-level fields.
    ///
    /// `partial` uses the wire names (`values`, `connectedParams`, `schema`, or any extra key);
    /// each named field is replaced wholesale. Only new or changed entries are validated,
    /// unless `partial` replaces the schema itself.
    pub fn merged(&self, node_id: &str, partial: &Map<String, Value>) -> Result<Self, NodeDataError> {
        let malformed = |e: serde_json::Error| NodeDataError::Malformed {
            node_id: node_id.to_string(),
            message: e.to_string(),
        };

        let mut fields = match serde_json::to_value(self).map_err(malformed)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        fields.extend(partial.iter().map(|(k, v)| (k.clone(), v.clone())));

        let merged: NodeData = serde_json::from_value(Value::Object(fields)).map_err(malformed)?;
        if partial.contains_key("schema") {
            merged.validate(node_id)?;
        } else {
            merged.validate_changes(node_id, self)?;
        }
        Ok(merged)
    }

    fn check_value(&self, node_id: &str, id: &str, value: &Value) -> Result<(), NodeDataError> {
        let param = self.require_parameter(node_id, id)?;
        if param.accepts(value) {
            Ok(())
        } else {
            Err(NodeDataError::TypeMismatch {
                node_id: node_id.to_string(),
                parameter: id.to_string(),
                expected: param.type_name.clone(),
                found: value.clone(),
            })
        }
    }

    fn check_link(&self, node_id: &str, id: &str, linked: &Value) -> Result<(), NodeDataError> {
        let param = self.require_parameter(node_id, id)?;
        if linked.as_bool() == Some(true) && !param.can_connect {
            return Err(NodeDataError::NotConnectable {
                node_id: node_id.to_string(),
                parameter: id.to_string(),
            });
        }
        Ok(())
    }

    fn require_parameter(&self, node_id: &str, id: &str) -> Result<&ParameterSchema, NodeDataError> {
        self.parameter(id)
            .ok_or_else(|| NodeDataError::UnknownParameter {
                node_id: node_id.to_string(),
                parameter: id.to_string(),
            })
    }
}
