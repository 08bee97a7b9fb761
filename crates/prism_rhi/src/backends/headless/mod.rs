//! Headless backend
//!
//! Implements every RHI trait without touching a GPU. Command lists record
//! an inspectable command log, buffers hold real byte contents with
//! transfers executing eagerly at record time, and the swapchain hands out
//! image indices round-robin. Used by the test suite, CI, and any
//! environment without a graphics driver.

mod commands;
mod render_pass;
mod resources;
mod rhi;
mod swapchain;

pub use commands::{HeadlessCommandList, HeadlessCommandQueue, RecordedCommand};
pub use render_pass::{HeadlessFramebuffer, HeadlessPipeline, HeadlessRenderPass};
pub use resources::{HeadlessBuffer, HeadlessTexture};
pub use rhi::HeadlessRhi;
pub use swapchain::HeadlessSwapchain;
