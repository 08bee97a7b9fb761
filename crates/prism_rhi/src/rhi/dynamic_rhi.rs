//! The RHI facade and its factory
//!
//! One [`DynamicRhi`] instance owns the device, swapchain, and graphics
//! queue for its backend. Construct it once at application start and pass it
//! to whatever needs it; there is no process-global instance.

use crate::backends::headless::HeadlessRhi;
use crate::backends::vulkan::VulkanRhi;
use crate::config::RhiSettings;
use crate::rhi::{
    Frame, FrameBeginInfo, RhiBackendType, RhiBuffer, RhiBufferCreateInfo, RhiCommandQueue,
    RhiError, RhiFramebuffer, RhiFramebufferCreateInfo, RhiPipeline, RhiPipelineCreateInfo,
    RhiRenderPass, RhiRenderPassCreateInfo, RhiResult, RhiSwapchain, RhiTexture,
    RhiTextureCreateInfo, RhiWindow,
};

/// Configuration for RHI construction
pub struct RhiCreateInfo<'a> {
    pub backend: RhiBackendType,
    /// Surface provider; required by GPU backends, ignored by headless
    pub window: Option<&'a dyn RhiWindow>,
    pub settings: RhiSettings,
}

/// Top-level RHI object: frame lifecycle entry points and resource
/// factories.
///
/// The frame loop is `begin_frame` → record against the returned token's
/// slot → `submit_frame`, one iteration per rendered frame. `begin_frame`
/// blocks on the slot's frame-in-flight fence and on image acquisition;
/// `submit_frame` wires the semaphore/fence chain, presents, and advances
/// the slot without waiting for the device to go idle.
pub trait DynamicRhi {
    fn backend_type(&self) -> RhiBackendType;

    /// Block until all submitted GPU work completes. Shutdown and tooling
    /// escape hatch, never part of the frame loop.
    fn wait_idle(&mut self) -> RhiResult<()>;

    /// Start a frame: wait and reset the current slot's fence, drain that
    /// slot's retired resources, acquire a swapchain image, and return the
    /// token for this iteration.
    ///
    /// At most one frame may be begun before its matching `submit_frame`.
    fn begin_frame(&mut self, info: &FrameBeginInfo) -> RhiResult<Frame>;

    /// Submit the frame's command lists in one batch (waiting image-ready,
    /// signaling rendering-finished, fencing the slot), present the acquired
    /// image, and advance to the next slot.
    ///
    /// Attached lists must be executable; submitting a list that is still
    /// recording is an `InvalidState` error. Submission and presentation
    /// failures surface as typed errors with no partial-submission recovery.
    fn submit_frame(&mut self, frame: Frame) -> RhiResult<()>;

    fn frames_in_flight(&self) -> u32;

    fn graphics_queue(&mut self) -> &mut dyn RhiCommandQueue;

    fn swapchain(&self) -> &dyn RhiSwapchain;

    fn create_buffer(&mut self, info: &RhiBufferCreateInfo) -> RhiResult<Box<dyn RhiBuffer>>;

    fn create_texture(&mut self, info: &RhiTextureCreateInfo) -> RhiResult<Box<dyn RhiTexture>>;

    fn create_render_pass(
        &mut self,
        info: &RhiRenderPassCreateInfo,
    ) -> RhiResult<Box<dyn RhiRenderPass>>;

    fn create_framebuffer(
        &mut self,
        info: &RhiFramebufferCreateInfo,
    ) -> RhiResult<Box<dyn RhiFramebuffer>>;

    fn create_pipeline(&mut self, info: &RhiPipelineCreateInfo) -> RhiResult<Box<dyn RhiPipeline>>;

    /// Hand a buffer to the deletion queue; it is destroyed once the GPU can
    /// no longer reference it
    fn retire_buffer(&mut self, buffer: Box<dyn RhiBuffer>);

    /// Hand a texture to the deletion queue
    fn retire_texture(&mut self, texture: Box<dyn RhiTexture>);
}

/// Build the RHI for the requested backend.
///
/// Construction failures identify the step that failed and the native error
/// code; there is no fallback backend selection.
pub fn create_rhi(create_info: &RhiCreateInfo) -> RhiResult<Box<dyn DynamicRhi>> {
    match create_info.backend {
        RhiBackendType::Vulkan => {
            let window = create_info.window.ok_or_else(|| {
                RhiError::invalid_state("the Vulkan backend requires a window for its surface")
            })?;
            Ok(Box::new(VulkanRhi::new(window, &create_info.settings)?))
        }
        RhiBackendType::D3d12 => {
            let reason = if cfg!(windows) {
                "the D3D12 backend is not compiled into this build".to_string()
            } else {
                format!("D3D12 requires Windows, not {}", std::env::consts::OS)
            };
            Err(RhiError::UnsupportedPlatform {
                backend: "D3D12",
                reason,
            })
        }
        RhiBackendType::Headless => Ok(Box::new(HeadlessRhi::new(&create_info.settings))),
    }
}
