use crate::resolver::TypeExpr;
use http::Method;

/// Media types recognized during request/response content negotiation
pub mod media {
    pub const JSON: &str = "application/json";
    pub const MSGPACK: &str = "application/msgpack";
    pub const TEXT: &str = "text/plain";
    pub const BINARY: &str = "application/x-binary";
    pub const OCTET_STREAM: &str = "application/octet-stream";
}

/// Where a parameter is transmitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    Path,
    Query,
    Header,
}

impl ParamLocation {
    /// Parse the document's `in` value; unknown and absent values default to
    /// query, matching permissive document handling elsewhere.
    pub fn from_document(value: Option<&str>) -> ParamLocation {
        match value {
            Some("path") => ParamLocation::Path,
            Some("header") => ParamLocation::Header,
            _ => ParamLocation::Query,
        }
    }
}

/// One resolved operation parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Literal parameter name transmitted over the network
    pub name: String,
    /// Sanitized surface variable name, unique within the operation
    pub var_name: String,
    pub location: ParamLocation,
    pub required: bool,
    pub ty: TypeExpr,
    pub description: Option<String>,
}

/// Resolved request body after content negotiation
#[derive(Debug, Clone, PartialEq)]
pub struct RequestBody {
    /// Selected media type
    pub media_type: &'static str,
    pub ty: TypeExpr,
    pub required: bool,
    pub supports_msgpack: bool,
    pub supports_json: bool,
}

/// Emission visibility of one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    /// Emitted but not part of the public surface; wrapped by custom methods
    Private,
    /// Not emitted at all
    Skip,
}

/// Fully resolved context for one operation
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDescriptor {
    /// Declared operation id, or one derived from method and path
    pub operation_id: String,
    pub method: Method,
    pub path: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub parameters: Vec<Parameter>,
    pub request_body: Option<RequestBody>,
    /// Resolved success response type
    pub response: TypeExpr,
    /// Some success response offers msgpack content
    pub returns_msgpack: bool,
    /// The document pins the `format` query parameter to msgpack; the client
    /// must inject it implicitly since the parameter is never exposed
    pub force_msgpack_query: bool,
    pub visibility: Visibility,
}
