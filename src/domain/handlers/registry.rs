// ============================================================================
// Handler Registry - Event Name -> Handler Kind
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    Register,
    Update,
    Deactivate,
}

impl HandlerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandlerKind::Register => "register",
            HandlerKind::Update => "update",
            HandlerKind::Deactivate => "deactivate",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("The eventName: {0} is not recognized.")]
pub struct RoutingError(pub String);

/// Upstream event names. Several names may share a handler kind.
const ROUTES: &[(&str, HandlerKind)] = &[
    ("alta_prestador", HandlerKind::Register),
    ("solicitado", HandlerKind::Register),
    ("alta_usuario", HandlerKind::Register),
    ("modificacion_prestador", HandlerKind::Update),
    ("modificacion_usuario", HandlerKind::Update),
    ("baja_prestador", HandlerKind::Deactivate),
    ("baja_usuario", HandlerKind::Deactivate),
];

/// Fixed routing table; anything not listed is a routing error
#[derive(Debug, Clone, Copy)]
pub struct HandlerRegistry {
    routes: &'static [(&'static str, HandlerKind)],
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self { routes: ROUTES }
    }
}

impl HandlerRegistry {
    /// Case-insensitive lookup
    pub fn resolve(&self, event_name: &str) -> Result<HandlerKind, RoutingError> {
        let name = event_name.trim();
        self.routes
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
            .map(|(_, kind)| *kind)
            .ok_or_else(|| RoutingError(event_name.to_string()))
    }
}
