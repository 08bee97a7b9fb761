//! Cube demo: the canonical frame loop against the prism RHI
//!
//! Creates a GLFW window, uploads a cube through the staging path, builds a
//! forward render pass + pipeline targeting the swapchain, and runs the
//! begin/record/submit loop until the window closes.
//!
//! Expects precompiled SPIR-V next to the working directory:
//! `shaders/forward.vert.spv` and `shaders/forward.frag.spv`.

mod geometry;
mod window;

use prism_rhi::prelude::*;
use prism_rhi::rhi::{
    AttachmentBlendState, ColorAttachmentDescription, DepthAttachmentDescription,
    FramebufferAttachment, ShaderStageCreateInfo, VertexInputAttribute, VertexInputBinding,
};
use window::Window;

fn parse_backend(arg: &str) -> RhiBackendType {
    match arg {
        "--vulkan" => RhiBackendType::Vulkan,
        "--d3d12" => RhiBackendType::D3d12,
        other => {
            log::warn!("invalid API argument {other}, defaulting to Vulkan");
            RhiBackendType::Vulkan
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let backend = std::env::args()
        .nth(1)
        .map(|arg| parse_backend(&arg))
        .unwrap_or(RhiBackendType::Vulkan);

    let mut window = Window::new(&format!("prism ({})", backend.name()), 1600, 900)?;

    let settings = RhiSettings {
        app_name: "cube_app".to_string(),
        ..RhiSettings::default()
    };
    let mut rhi = create_rhi(&RhiCreateInfo {
        backend,
        window: Some(&window),
        settings,
    })?;

    // Cube vertex and index buffers, filled through the staging path
    let vertex_bytes: &[u8] = bytemuck::cast_slice(&geometry::CUBE_VERTICES);
    let index_bytes: &[u8] = bytemuck::cast_slice(&geometry::CUBE_INDICES);

    let vertex_buffer = rhi.create_buffer(&RhiBufferCreateInfo {
        size: vertex_bytes.len() as u64,
        buffer_type: BufferType::Vertex,
        initial_data: Some(vertex_bytes),
        debug_name: "cube vertices",
    })?;
    let index_buffer = rhi.create_buffer(&RhiBufferCreateInfo {
        size: index_bytes.len() as u64,
        buffer_type: BufferType::Index,
        initial_data: Some(index_bytes),
        debug_name: "cube indices",
    })?;

    // Render targets
    let extent = rhi.swapchain().size();
    let swapchain_format = rhi.swapchain().format();
    let image_count = rhi.swapchain().image_count();

    let depth_texture = rhi.create_texture(&RhiTextureCreateInfo {
        size: extent,
        format: Format::D32Sfloat,
        sampled: false,
        debug_name: "depth texture",
    })?;

    let render_pass = rhi.create_render_pass(&RhiRenderPassCreateInfo {
        color_attachments: vec![ColorAttachmentDescription {
            format: swapchain_format,
            final_layout: ImageLayout::PresentSrc,
            ..ColorAttachmentDescription::default()
        }],
        depth_attachment: Some(DepthAttachmentDescription::default()),
        render_area: Rect2D::from_size(extent),
        debug_name: "forward pass",
    })?;

    let framebuffers = rhi.create_framebuffer(&RhiFramebufferCreateInfo {
        count: image_count,
        render_pass: &*render_pass,
        extent,
        attachments: vec![
            FramebufferAttachment {
                source: AttachmentSource::Swapchain,
                attachment_index: 0,
            },
            FramebufferAttachment {
                source: AttachmentSource::Texture(&*depth_texture),
                attachment_index: 1,
            },
        ],
        debug_name: "forward framebuffers",
    })?;

    // Forward pipeline from precompiled shader bytecode
    let vertex_spv = std::fs::read("shaders/forward.vert.spv")
        .map_err(|e| format!("shaders/forward.vert.spv: {e}"))?;
    let fragment_spv = std::fs::read("shaders/forward.frag.spv")
        .map_err(|e| format!("shaders/forward.frag.spv: {e}"))?;

    let pipeline = rhi.create_pipeline(&RhiPipelineCreateInfo {
        shader_stages: vec![
            ShaderStageCreateInfo {
                stage: ShaderStage::Vertex,
                bytecode: &vertex_spv,
                entry_point: "main",
            },
            ShaderStageCreateInfo {
                stage: ShaderStage::Fragment,
                bytecode: &fragment_spv,
                entry_point: "main",
            },
        ],
        cull_mode: CullMode::Back,
        vertex_attributes: vec![
            VertexInputAttribute {
                location: 0,
                binding: 0,
                format: Format::R32G32B32Sfloat,
                offset: 0,
            },
            VertexInputAttribute {
                location: 1,
                binding: 0,
                format: Format::R32G32B32Sfloat,
                offset: 12,
            },
            VertexInputAttribute {
                location: 2,
                binding: 0,
                format: Format::R32G32Sfloat,
                offset: 24,
            },
        ],
        vertex_bindings: vec![VertexInputBinding {
            binding: 0,
            stride: geometry::VERTEX_STRIDE,
            input_rate: prism_rhi::rhi::VertexInputRate::Vertex,
        }],
        blend_states: vec![AttachmentBlendState::disabled()],
        render_pass: &*render_pass,
        debug_name: "forward pipeline",
    })?;

    log::info!("entering frame loop");

    while !window.should_close() {
        window.poll_events();

        let mut frame = rhi.begin_frame(&FrameBeginInfo::default())?;

        let viewport = rhi.swapchain().viewport();
        let scissor = rhi.swapchain().scissor();

        let list = rhi.graphics_queue().command_list(frame.current_slot())?;
        list.begin()?;
        render_pass.execute(list, &*framebuffers, frame.image_index(), &mut |cmd| {
            cmd.set_viewport(viewport)?;
            cmd.set_scissor(scissor)?;
            pipeline.bind(cmd)?;
            cmd.bind_vertex_buffer(&*vertex_buffer)?;
            cmd.bind_index_buffer(&*index_buffer)?;
            cmd.draw_indexed(geometry::CUBE_INDICES.len() as u32, 1, 0, 0, 0)
        })?;
        list.end()?;

        let id = list.id();
        frame.add_command_list(id);
        rhi.submit_frame(frame)?;
    }

    rhi.wait_idle()?;
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}
