use sysinfo::{MemoryRefreshKind, RefreshKind, System};

use crate::types::{WidgetRecord, RED, WHITE};
use crate::widgets::{RenderContext, Widget, WidgetError, WidgetResult};

/// Used memory percent, counting reclaimable memory as free.
pub struct FreeMemory {
    label: String,
    sys: System,
}

impl FreeMemory {
    pub fn new(label: &str) -> Self {
        let sys = System::new_with_specifics(
            RefreshKind::nothing().with_memory(MemoryRefreshKind::nothing().with_ram()),
        );
        Self {
            label: label.to_string(),
            sys,
        }
    }
}

pub fn used_percent(total: u64, available: u64) -> Option<u64> {
    if total == 0 {
        return None;
    }
    Some(100 - (100 * available.min(total)) / total)
}

impl Widget for FreeMemory {
    fn render(&mut self, _ctx: &RenderContext<'_>) -> WidgetResult {
        self.sys.refresh_memory_specifics(MemoryRefreshKind::nothing().with_ram());
        let percent = used_percent(self.sys.total_memory(), self.sys.available_memory())
            .ok_or(WidgetError::Missing("memory total".into()))?;
        let color = if percent < 80 { WHITE } else { RED };
        Ok(WidgetRecord::text(color, format!("{}{percent}%", self.label)))
    }
}
