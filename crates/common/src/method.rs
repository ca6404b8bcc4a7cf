//! Static descriptor tables for HTTP methods and schema slots.

use std::fmt;

/// HTTP methods a route record may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    /// `DELETE`
    Delete,
    /// `GET`
    Get,
    /// `HEAD`
    Head,
    /// `OPTIONS`
    Options,
    /// `PATCH`
    Patch,
    /// `POST`
    Post,
    /// `PUT`
    Put,
}

impl Method {
    /// Every method in the table, in canonical order.
    pub const ALL: [Method; 7] = [
        Method::Delete,
        Method::Get,
        Method::Head,
        Method::Options,
        Method::Patch,
        Method::Post,
        Method::Put,
    ];

    /// Canonical uppercase identifier, used as the key in generated schemas.
    pub fn uppercase(self) -> &'static str {
        match self {
            Method::Delete => "DELETE",
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Patch => "PATCH",
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }

    /// Capitalized form, used when building type titles.
    pub fn capitalized(self) -> &'static str {
        match self {
            Method::Delete => "Delete",
            Method::Get => "Get",
            Method::Head => "Head",
            Method::Options => "Options",
            Method::Patch => "Patch",
            Method::Post => "Post",
            Method::Put => "Put",
        }
    }

    /// POST, PUT and PATCH carry a request body.
    pub fn has_body(self) -> bool {
        matches!(self, Method::Post | Method::Put | Method::Patch)
    }

    /// The slot list that applies to this method.
    pub fn slots(self) -> &'static [Slot] {
        if self.has_body() {
            &SLOTS_WITH_BODY
        } else {
            &SLOTS
        }
    }

    /// Look a method up by name, ignoring case.
    ///
    /// Names outside the table yield `None`; callers skip them.
    pub fn parse(name: &str) -> Option<Method> {
        Method::ALL
            .into_iter()
            .find(|method| method.uppercase().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.uppercase())
    }
}

/// The five request/response facets of a route schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Request body, only for body-bearing methods.
    Body,
    /// Query string.
    Querystring,
    /// Path parameters.
    Params,
    /// Request headers.
    Headers,
    /// Status-keyed replies.
    Response,
}

impl Slot {
    /// Key of the slot inside a route schema.
    pub fn name(self) -> &'static str {
        match self {
            Slot::Body => "body",
            Slot::Querystring => "querystring",
            Slot::Params => "params",
            Slot::Headers => "headers",
            Slot::Response => "response",
        }
    }

    /// Key of the slot inside the generated method schema.
    pub fn capitalized(self) -> &'static str {
        match self {
            Slot::Body => "Body",
            Slot::Querystring => "Querystring",
            Slot::Params => "Params",
            Slot::Headers => "Headers",
            Slot::Response => "Reply",
        }
    }
}

/// Slots applied to body-bearing methods.
pub const SLOTS_WITH_BODY: [Slot; 5] = [
    Slot::Body,
    Slot::Querystring,
    Slot::Params,
    Slot::Headers,
    Slot::Response,
];

/// Slots applied to every other method.
pub const SLOTS: [Slot; 4] = [Slot::Querystring, Slot::Params, Slot::Headers, Slot::Response];
