//! The window-backed ghost: GPU, renderer and a mounted `GhostView`.
//!
//! Drive it with the app runner:
//! `run_with_builder(config, |window| async move { GhostState::new(window, GhostConfig::default()).await })`

use std::sync::Arc;

use anyhow::Context as _;
use log::{info, warn};
use winit::window::Window;

use crate::font::FontSystem;
use crate::ghost::caption::build_caption;
use crate::ghost::{GhostConfig, GhostView};
use crate::render::{
    app::AppState,
    gpu::Gpu,
    mesh_renderer::MeshRenderer,
    util::{FrameClock, physical_to_pt},
};

/// Clear color behind the background quad (only visible before the first frame lands).
const CLEAR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

pub struct GhostState {
    pub window: Arc<Window>,
    pub gpu: Gpu,
    pub renderer: MeshRenderer,
    pub view: GhostView,
    clock: FrameClock,
}

impl GhostState {
    /// Build the view for `window` and mount it at clock time zero.
    pub async fn new(window: Arc<Window>, config: GhostConfig) -> anyhow::Result<Self> {
        let gpu = Gpu::new(window.clone()).await?;
        let viewport_pt = physical_to_pt(gpu.size, window.scale_factor());

        let caption = match FontSystem::new().and_then(|fonts| build_caption(&fonts, &config)) {
            Ok(text) => Some(text),
            Err(err) => {
                warn!("caption unavailable, rendering without it: {err}");
                None
            }
        };

        let mut view = GhostView::new(config, viewport_pt, caption)
            .context("ghost: failed to tessellate the ghost")?;
        let renderer = MeshRenderer::new(&gpu)?;

        let clock = FrameClock::new();
        view.mount(clock.elapsed_s());

        Ok(Self {
            window,
            gpu,
            renderer,
            view,
            clock,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.gpu.resize(new_size);
        let viewport_pt = physical_to_pt(new_size, self.window.scale_factor());
        self.view.resize(viewport_pt);
    }

    /// Advance the animation, render one frame, and schedule the next one.
    pub fn render(&mut self) -> anyhow::Result<()> {
        if !self.gpu.is_configured() {
            return Ok(());
        }

        self.view.update(self.clock.elapsed_s());

        let (surface_texture, target) = match self.gpu.acquire_frame() {
            Ok(v) => v,
            Err(wgpu::SurfaceError::Outdated)
            | Err(wgpu::SurfaceError::Lost)
            | Err(wgpu::SurfaceError::Other) => {
                self.gpu.resize(self.gpu.size);
                self.window.request_redraw();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                self.window.request_redraw();
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                return Err(anyhow::anyhow!("wgpu SurfaceError::OutOfMemory"));
            }
        };

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Ghost Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Ghost Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            let items = self.view.draw_items();
            self.renderer
                .draw_items(&self.gpu, &mut pass, &self.view.scene().camera, &items);
        }

        self.gpu.queue.submit(Some(encoder.finish()));
        self.window.pre_present_notify();
        surface_texture.present();

        // Animations repeat forever; keep frames coming.
        self.window.request_redraw();

        Ok(())
    }
}

impl AppState for GhostState {
    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        Self::resize(self, new_size)
    }

    fn render(&mut self) -> anyhow::Result<()> {
        Self::render(self)
    }

    fn request_redraw(&self) {
        self.window.request_redraw();
    }

    fn shutdown(&mut self) {
        info!("shutting down after {:.1}s", self.clock.elapsed_s());
        self.view.unmount();
    }
}
