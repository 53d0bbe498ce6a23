use serde::Serialize;

/// Body of `GET /health`.
#[derive(Serialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

impl Health {
    pub fn ok() -> Self {
        Self { status: "ok" }
    }
}

/// Plain acknowledgement body: `{"ok": true}`.
#[derive(Serialize, Debug, Clone, Copy)]
pub struct Ack {
    pub ok: bool,
}

impl Ack {
    pub const OK: Ack = Ack { ok: true };
    pub const FAILED: Ack = Ack { ok: false };
}
