//! Declarative object description

use crate::decode::{Marshaller, RecordDecoder};
use crate::pagination::PaginationRule;
use crate::types::{CursorFormat, Method};

/// Page size parameter of an object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSize {
    pub param: &'static str,
    pub default: u32,
    pub max: u32,
}

impl PageSize {
    pub const fn new(param: &'static str, default: u32, max: u32) -> Self {
        Self {
            param,
            default,
            max,
        }
    }

    /// Requested size clamped to `1..=max`, or the default
    pub fn resolve(&self, requested: Option<u32>) -> u32 {
        requested.map_or(self.default, |n| n.clamp(1, self.max))
    }
}

/// How `since`/`until` are expressed for an object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Incremental {
    /// Not supported; bounds are ignored
    #[default]
    None,

    /// `filter=greater-than(field,ts),less-than(field,ts)` with the caller
    /// filter appended
    FilterExpression {
        field: &'static str,
        format: CursorFormat,
    },

    /// Separate query parameters for the lower and upper bound
    QueryRange {
        since: &'static str,
        until: Option<&'static str>,
        format: CursorFormat,
    },

    /// `If-Modified-Since` header; an upper bound cannot be expressed
    IfModifiedSince,
}

/// Where updates are sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdatePath {
    /// `<object path>/<record id>`
    #[default]
    PerRecord,
    /// The collection URL; the id travels in the body
    Collection,
}

/// Content type of write bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyEncoding {
    #[default]
    Json,
    Form,
}

/// How record data is wrapped before sending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyWrap {
    /// Sent as-is
    #[default]
    None,
    /// `{ <key>: record }`
    Key(&'static str),
    /// `{ <key>: [record] }`
    ArrayUnder(&'static str),
}

/// Where a created record's id is found in the write response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdLocation {
    /// Dotted path to a scalar
    Path(&'static str),
    /// Last segment of a URI at a dotted path
    LastUriSegment(&'static str),
    /// First key of the object at a dotted path
    FirstMapKey(&'static str),
    /// Dotted path `id` inside the first element of the array at `path`
    FirstArrayItem { path: &'static str, id: &'static str },
    /// No id in the response
    #[default]
    None,
}

/// Write behavior of an object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteSpec {
    /// Method for creates; `None` when creates are unsupported
    pub create: Option<Method>,
    /// Method for updates; `None` when updates are unsupported
    pub update: Option<Method>,
    pub update_path: UpdatePath,
    pub encoding: BodyEncoding,
    pub wrap: BodyWrap,
    pub record_id: IdLocation,
}

impl Default for WriteSpec {
    fn default() -> Self {
        Self::new()
    }
}

impl WriteSpec {
    /// POST creates, PATCH updates at `<path>/<id>`, JSON bodies, id at `id`
    pub const fn new() -> Self {
        Self {
            create: Some(Method::POST),
            update: Some(Method::PATCH),
            update_path: UpdatePath::PerRecord,
            encoding: BodyEncoding::Json,
            wrap: BodyWrap::None,
            record_id: IdLocation::Path("id"),
        }
    }

    #[must_use]
    pub const fn update_with(mut self, method: Method) -> Self {
        self.update = Some(method);
        self
    }

    #[must_use]
    pub const fn create_only(mut self) -> Self {
        self.update = None;
        self
    }

    #[must_use]
    pub const fn encoding(mut self, encoding: BodyEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    #[must_use]
    pub const fn wrap(mut self, wrap: BodyWrap) -> Self {
        self.wrap = wrap;
        self
    }

    #[must_use]
    pub const fn record_id(mut self, location: IdLocation) -> Self {
        self.record_id = location;
        self
    }

    #[must_use]
    pub const fn update_path(mut self, path: UpdatePath) -> Self {
        self.update_path = path;
        self
    }
}

/// Declarative description of one object of one adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectSpec {
    /// Display name used by inferred metadata
    pub name: &'static str,
    /// Path template relative to the module root
    pub path: &'static str,
    pub records: RecordDecoder,
    pub marshaller: Marshaller,
    pub pagination: PaginationRule,
    pub page_size: Option<PageSize>,
    pub incremental: Incremental,
    /// Static query parameters (values may be templates)
    pub query: &'static [(&'static str, &'static str)],
    pub write: Option<WriteSpec>,
    /// Query parameter carrying a caller filter, when not part of `incremental`
    pub filter_param: Option<&'static str>,
}

impl ObjectSpec {
    /// Object at `path` with records at `records_path`
    pub const fn new(name: &'static str, path: &'static str, records_path: &'static str) -> Self {
        Self {
            name,
            path,
            records: RecordDecoder::at(records_path),
            marshaller: Marshaller::new(crate::decode::RecordShape::Plain, "id"),
            pagination: PaginationRule::Absent,
            page_size: None,
            incremental: Incremental::None,
            query: &[],
            write: None,
            filter_param: None,
        }
    }

    #[must_use]
    pub const fn records(mut self, records: RecordDecoder) -> Self {
        self.records = records;
        self
    }

    #[must_use]
    pub const fn marshaller(mut self, marshaller: Marshaller) -> Self {
        self.marshaller = marshaller;
        self
    }

    #[must_use]
    pub const fn pagination(mut self, rule: PaginationRule) -> Self {
        self.pagination = rule;
        self
    }

    #[must_use]
    pub const fn page_size(mut self, size: PageSize) -> Self {
        self.page_size = Some(size);
        self
    }

    #[must_use]
    pub const fn incremental(mut self, incremental: Incremental) -> Self {
        self.incremental = incremental;
        self
    }

    #[must_use]
    pub const fn query(mut self, query: &'static [(&'static str, &'static str)]) -> Self {
        self.query = query;
        self
    }

    #[must_use]
    pub const fn write(mut self, write: WriteSpec) -> Self {
        self.write = Some(write);
        self
    }

    #[must_use]
    pub const fn filter_param(mut self, param: &'static str) -> Self {
        self.filter_param = Some(param);
        self
    }
}
