//! FPS overlay plugin

use crate::plugin::context::{HostContext, RenderSurface};
use crate::plugin::error::PluginResult;
use crate::plugin::traits::Plugin;

pub struct FpsDisplayPlugin {
    context: HostContext,
}

impl FpsDisplayPlugin {
    pub fn new(context: HostContext) -> Self {
        Self { context }
    }
}

impl Plugin for FpsDisplayPlugin {
    fn on_render(&mut self, surface: &mut dyn RenderSurface) -> PluginResult<()> {
        let fps = self.context.clock().fps().round() as i64;
        surface.draw_text(10, 10, &format!("FPS: {}", fps));
        Ok(())
    }
}

pub fn create(context: &HostContext) -> PluginResult<Box<dyn Plugin>> {
    Ok(Box::new(FpsDisplayPlugin::new(context.clone())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::context::TextSurface;

    #[test]
    fn test_renders_clock_rate() {
        let context = HostContext::new();
        context.clock().tick(1.0 / 60.0);

        let mut plugin = FpsDisplayPlugin::new(context);
        let mut surface = TextSurface::new();
        plugin.on_render(&mut surface).unwrap();

        assert_eq!(surface.lines(), &[(10, 10, "FPS: 60".to_string())]);
    }
}
