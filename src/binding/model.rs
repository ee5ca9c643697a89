//! Model binding: the static configuration attached to one admin resource.

use crate::binding::schema::ModelSchema;

/// Primary key shape: a single field, or an ordered list of fields whose
/// values arrive as `/`-separated path segments.
#[derive(Clone, Debug)]
pub enum PkDescriptor {
    Scalar(String),
    Composite(Vec<String>),
}

impl PkDescriptor {
    pub fn fields(&self) -> Vec<&str> {
        match self {
            PkDescriptor::Scalar(f) => vec![f.as_str()],
            PkDescriptor::Composite(fs) => fs.iter().map(|f| f.as_str()).collect(),
        }
    }
}

/// Immutable per-resource configuration, set at registration time and shared
/// read-only into every handler invocation.
#[derive(Clone, Debug)]
pub struct ModelBinding {
    /// Display name, e.g. "Client". Used in messages and view titles.
    pub name: String,
    /// URL segment under the panel prefix, e.g. "client".
    pub resource: String,
    pub icon: String,
    pub table_name: String,
    pub schema_name: String,
    pub pk: PkDescriptor,
    pub allowed_groups: Vec<String>,
    pub can_create: bool,
    pub can_update: bool,
    pub can_delete: bool,
    pub schema: ModelSchema,
}

impl ModelBinding {
    pub fn new(
        name: impl Into<String>,
        resource: impl Into<String>,
        table_name: impl Into<String>,
        schema: ModelSchema,
    ) -> Self {
        ModelBinding {
            name: name.into(),
            resource: resource.into(),
            icon: "book".into(),
            table_name: table_name.into(),
            schema_name: "public".into(),
            pk: PkDescriptor::Scalar("id".into()),
            allowed_groups: vec!["superuser".into()],
            can_create: true,
            can_update: true,
            can_delete: true,
            schema,
        }
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn db_schema(mut self, schema_name: impl Into<String>) -> Self {
        self.schema_name = schema_name.into();
        self
    }

    pub fn pk(mut self, field: impl Into<String>) -> Self {
        self.pk = PkDescriptor::Scalar(field.into());
        self
    }

    pub fn composite_pk(mut self, fields: Vec<String>) -> Self {
        self.pk = PkDescriptor::Composite(fields);
        self
    }

    pub fn allowed_groups(mut self, groups: Vec<String>) -> Self {
        self.allowed_groups = groups;
        self
    }

    pub fn readonly(mut self) -> Self {
        self.can_create = false;
        self.can_update = false;
        self.can_delete = false;
        self
    }

    pub fn no_create(mut self) -> Self {
        self.can_create = false;
        self
    }

    pub fn no_update(mut self) -> Self {
        self.can_update = false;
        self
    }

    pub fn no_delete(mut self) -> Self {
        self.can_delete = false;
        self
    }

    /// Schema document for `:meta` and the HEAD introspection headers.
    pub fn json_schema(&self) -> serde_json::Value {
        self.schema
            .json_schema(&self.name, &self.table_name, &self.schema_name)
    }
}
