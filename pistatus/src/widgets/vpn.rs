use std::path::PathBuf;

use crate::types::{WidgetRecord, BLACK, GREEN, RED};
use crate::widgets::{RenderContext, Widget, WidgetResult};

/// Tunnel presence, from the per-interface IPv4 sysctl directory.
pub struct Vpn {
    iface_dir: PathBuf,
}

impl Vpn {
    pub fn new(iface: &str) -> Self {
        Self::with_conf_root("/proc/sys/net/ipv4/conf", iface)
    }

    pub fn with_conf_root(root: impl Into<PathBuf>, iface: &str) -> Self {
        Self {
            iface_dir: root.into().join(iface),
        }
    }
}

pub fn vpn_record(up: bool) -> WidgetRecord {
    if up {
        WidgetRecord::text(GREEN, "VPN ON").with_background(BLACK)
    } else {
        WidgetRecord::text(BLACK, "VPN OFF").with_background(RED)
    }
}

impl Widget for Vpn {
    fn render(&mut self, _ctx: &RenderContext<'_>) -> WidgetResult {
        Ok(vpn_record(self.iface_dir.is_dir()))
    }
}
