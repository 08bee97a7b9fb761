//! Frame lifecycle and resource protocol tests, run against the headless
//! backend so they work without a GPU or display

use prism_rhi::backends::headless::RecordedCommand;
use prism_rhi::prelude::*;
use prism_rhi::rhi::{ColorAttachmentDescription, FramebufferAttachment};

fn init() -> Box<dyn DynamicRhi> {
    let _ = env_logger::builder().is_test(true).try_init();
    let settings = RhiSettings {
        frames_in_flight: 2,
        swapchain_images: 2,
        ..RhiSettings::default()
    };
    create_rhi(&RhiCreateInfo {
        backend: RhiBackendType::Headless,
        window: None,
        settings,
    })
    .expect("headless RHI construction")
}

#[test]
fn test_command_list_state_machine() {
    let mut rhi = init();
    let queue = rhi.graphics_queue();
    let list = queue.command_list(0).unwrap();

    // A fresh list accepts begin
    list.begin().unwrap();
    // begin while recording is rejected
    assert!(matches!(
        list.begin().unwrap_err(),
        RhiError::InvalidState { .. }
    ));
    list.end().unwrap();
    // end without recording is rejected
    assert!(matches!(
        list.end().unwrap_err(),
        RhiError::InvalidState { .. }
    ));
    // an executable list can be re-begun
    list.begin().unwrap();
    list.end().unwrap();
}

#[test]
fn test_recording_required_for_draws() {
    let mut rhi = init();
    let list = rhi.graphics_queue().command_list(0).unwrap();
    assert!(matches!(
        list.draw(3, 1, 0, 0).unwrap_err(),
        RhiError::InvalidState { .. }
    ));
    assert!(matches!(
        list.draw_indexed(3, 1, 0, 0, 0).unwrap_err(),
        RhiError::InvalidState { .. }
    ));
}

#[test]
fn test_command_list_pool_bounds() {
    let mut rhi = init();
    let queue = rhi.graphics_queue();
    assert_eq!(queue.pool_size(), 2);
    assert!(queue.command_list(1).is_ok());
    match queue.command_list(2).unwrap_err() {
        RhiError::OutOfRange { index, size } => {
            assert_eq!(index, 2);
            assert_eq!(size, 2);
        }
        other => panic!("expected OutOfRange, got {other:?}"),
    }
}

#[test]
fn test_frame_slots_cycle_with_period_two() {
    let mut rhi = init();
    let mut slots = Vec::new();
    for _ in 0..5 {
        let frame = rhi.begin_frame(&FrameBeginInfo::default()).unwrap();
        slots.push(frame.current_slot());
        rhi.submit_frame(frame).unwrap();
    }
    assert_eq!(slots, vec![0, 1, 0, 1, 0]);
}

#[test]
fn test_double_begin_frame_rejected() {
    let mut rhi = init();
    let _frame = rhi.begin_frame(&FrameBeginInfo::default()).unwrap();
    assert!(matches!(
        rhi.begin_frame(&FrameBeginInfo::default()).unwrap_err(),
        RhiError::InvalidState { .. }
    ));
}

#[test]
fn test_host_visible_buffer_accepts_set_data() {
    let mut rhi = init();
    let buffer = rhi
        .create_buffer(&RhiBufferCreateInfo {
            size: 16,
            buffer_type: BufferType::Staging,
            initial_data: None,
            debug_name: "staging",
        })
        .unwrap();

    let payload = [7u8; 16];
    buffer.set_data(&payload).unwrap();
    assert_eq!(&*buffer.as_headless().unwrap().contents(), &payload);
}

#[test]
fn test_device_local_buffer_ignores_set_data() {
    let mut rhi = init();
    let buffer = rhi
        .create_buffer(&RhiBufferCreateInfo {
            size: 16,
            buffer_type: BufferType::Vertex,
            initial_data: None,
            debug_name: "vertex",
        })
        .unwrap();

    // A warn-and-no-op, not an error
    buffer.set_data(&[9u8; 16]).unwrap();
    assert_eq!(&*buffer.as_headless().unwrap().contents(), &[0u8; 16]);
}

#[test]
fn test_upload_round_trip() {
    let mut rhi = init();
    let vertices: [f32; 6] = [0.0, 0.5, -0.5, -0.5, 0.5, -0.5];
    let payload: &[u8] = bytemuck::cast_slice(&vertices);

    let buffer = rhi
        .create_buffer(&RhiBufferCreateInfo {
            size: payload.len() as u64,
            buffer_type: BufferType::Vertex,
            initial_data: Some(payload),
            debug_name: "triangle vertices",
        })
        .unwrap();

    // The transparent stage-and-copy filled the device-local buffer
    assert_eq!(&*buffer.as_headless().unwrap().contents(), payload);

    // Read back through an explicit staging copy
    let readback = rhi
        .create_buffer(&RhiBufferCreateInfo {
            size: payload.len() as u64,
            buffer_type: BufferType::Staging,
            initial_data: None,
            debug_name: "readback",
        })
        .unwrap();
    rhi.graphics_queue()
        .execute_single_time_command(&mut |cmd| cmd.copy_buffer(&*buffer, &*readback))
        .unwrap();
    assert_eq!(&*readback.as_headless().unwrap().contents(), payload);
}

#[test]
fn test_buffer_type_checked_at_bind() {
    let mut rhi = init();
    let uniform = rhi
        .create_buffer(&RhiBufferCreateInfo {
            size: 64,
            buffer_type: BufferType::Uniform,
            initial_data: None,
            debug_name: "uniform",
        })
        .unwrap();

    let list = rhi.graphics_queue().command_list(0).unwrap();
    list.begin().unwrap();
    assert!(matches!(
        list.bind_vertex_buffer(&*uniform).unwrap_err(),
        RhiError::InvalidState { .. }
    ));
    assert!(matches!(
        list.bind_index_buffer(&*uniform).unwrap_err(),
        RhiError::InvalidState { .. }
    ));
    list.end().unwrap();
}

#[test]
fn test_render_pass_scopes_body_between_transitions() {
    let mut rhi = init();
    let extent = rhi.swapchain().size();
    let render_pass = rhi
        .create_render_pass(&RhiRenderPassCreateInfo {
            color_attachments: vec![ColorAttachmentDescription::default()],
            depth_attachment: None,
            render_area: Rect2D::from_size(extent),
            debug_name: "scoping pass",
        })
        .unwrap();
    let framebuffer = rhi
        .create_framebuffer(&RhiFramebufferCreateInfo {
            count: 2,
            render_pass: &*render_pass,
            extent,
            attachments: vec![FramebufferAttachment {
                source: AttachmentSource::Swapchain,
                attachment_index: 0,
            }],
            debug_name: "scoping framebuffer",
        })
        .unwrap();

    let list = rhi.graphics_queue().command_list(0).unwrap();
    list.begin().unwrap();
    let mut body_calls = 0;
    render_pass
        .execute(list, &*framebuffer, 0, &mut |cmd| {
            body_calls += 1;
            cmd.draw(3, 1, 0, 0)
        })
        .unwrap();
    list.end().unwrap();
    assert_eq!(body_calls, 1);

    let log = list.as_headless().unwrap().commands().to_vec();
    let begin = log
        .iter()
        .position(|c| matches!(c, RecordedCommand::BeginRenderPass { .. }))
        .unwrap();
    let draw = log
        .iter()
        .position(|c| matches!(c, RecordedCommand::Draw { .. }))
        .unwrap();
    let end = log
        .iter()
        .position(|c| matches!(c, RecordedCommand::EndRenderPass { .. }))
        .unwrap();
    assert!(begin < draw && draw < end);

    // Indexing past the framebuffer set is rejected
    let list = rhi.graphics_queue().command_list(0).unwrap();
    list.begin().unwrap();
    let err = render_pass
        .execute(list, &*framebuffer, 2, &mut |_| Ok(()))
        .unwrap_err();
    assert!(matches!(err, RhiError::OutOfRange { .. }));
    list.end().unwrap();
}

#[test]
fn test_submitting_recording_list_rejected() {
    let mut rhi = init();
    let mut frame = rhi.begin_frame(&FrameBeginInfo::default()).unwrap();
    let slot = frame.current_slot();

    let list = rhi.graphics_queue().command_list(slot).unwrap();
    list.begin().unwrap();
    let id = list.id();
    frame.add_command_list(id);

    // Still recording when submitted
    assert!(matches!(
        rhi.submit_frame(frame).unwrap_err(),
        RhiError::InvalidState { .. }
    ));
}

#[test]
fn test_single_time_command_is_scoped() {
    let mut rhi = init();
    let queue = rhi.graphics_queue();

    let mut calls = 0;
    queue
        .execute_single_time_command(&mut |cmd| {
            calls += 1;
            assert!(cmd.state().is_recording());
            Ok(())
        })
        .unwrap();
    assert_eq!(calls, 1);

    // A failing body submits nothing and leaves the list reusable
    let err = queue
        .execute_single_time_command(&mut |_| Err(RhiError::invalid_state("forced failure")))
        .unwrap_err();
    assert!(matches!(err, RhiError::InvalidState { .. }));
    queue
        .execute_single_time_command(&mut |_| Ok(()))
        .unwrap();
}

#[test]
fn test_retired_resources_survive_until_safe() {
    let mut rhi = init();
    let buffer = rhi
        .create_buffer(&RhiBufferCreateInfo {
            size: 4,
            buffer_type: BufferType::Staging,
            initial_data: None,
            debug_name: "short-lived",
        })
        .unwrap();
    rhi.retire_buffer(buffer);

    // Two full cycles pass the retiring slot's fence again
    for _ in 0..2 {
        let frame = rhi.begin_frame(&FrameBeginInfo::default()).unwrap();
        rhi.submit_frame(frame).unwrap();
    }
    rhi.wait_idle().unwrap();
}

#[test]
fn test_factory_backend_availability() {
    let settings = RhiSettings::default();

    let err = create_rhi(&RhiCreateInfo {
        backend: RhiBackendType::D3d12,
        window: None,
        settings: settings.clone(),
    })
    .err()
    .expect("D3D12 is not available in this build");
    assert!(matches!(err, RhiError::UnsupportedPlatform { .. }));

    let err = create_rhi(&RhiCreateInfo {
        backend: RhiBackendType::Vulkan,
        window: None,
        settings,
    })
    .err()
    .expect("Vulkan requires a window");
    assert!(matches!(err, RhiError::InvalidState { .. }));
}

/// The end-to-end scenario: two frames in flight, a two-image swapchain,
/// five frames each drawing an indexed cube into a swapchain render pass
#[test]
fn test_five_frame_cube_scenario() {
    let mut rhi = init();

    let vertices: Vec<f32> = (0..8 * 3).map(|i| i as f32).collect();
    let vertex_bytes: &[u8] = bytemuck::cast_slice(&vertices);
    let indices: Vec<u32> = (0..36).map(|i| i % 8).collect();
    let index_bytes: &[u8] = bytemuck::cast_slice(&indices);

    let vertex_buffer = rhi
        .create_buffer(&RhiBufferCreateInfo {
            size: vertex_bytes.len() as u64,
            buffer_type: BufferType::Vertex,
            initial_data: Some(vertex_bytes),
            debug_name: "cube vertices",
        })
        .unwrap();
    let index_buffer = rhi
        .create_buffer(&RhiBufferCreateInfo {
            size: index_bytes.len() as u64,
            buffer_type: BufferType::Index,
            initial_data: Some(index_bytes),
            debug_name: "cube indices",
        })
        .unwrap();

    let extent = rhi.swapchain().size();
    let render_pass = rhi
        .create_render_pass(&RhiRenderPassCreateInfo {
            color_attachments: vec![ColorAttachmentDescription::default()],
            depth_attachment: None,
            render_area: Rect2D::from_size(extent),
            debug_name: "cube pass",
        })
        .unwrap();
    let framebuffer = rhi
        .create_framebuffer(&RhiFramebufferCreateInfo {
            count: 2,
            render_pass: &*render_pass,
            extent,
            attachments: vec![FramebufferAttachment {
                source: AttachmentSource::Swapchain,
                attachment_index: 0,
            }],
            debug_name: "cube framebuffer",
        })
        .unwrap();
    let pipeline = rhi
        .create_pipeline(&RhiPipelineCreateInfo {
            shader_stages: vec![],
            cull_mode: CullMode::Back,
            vertex_attributes: vec![],
            vertex_bindings: vec![],
            blend_states: vec![prism_rhi::rhi::AttachmentBlendState::disabled()],
            render_pass: &*render_pass,
            debug_name: "cube pipeline",
        })
        .unwrap();

    let mut slots = Vec::new();
    let mut images = Vec::new();

    for _ in 0..5 {
        let mut frame = rhi.begin_frame(&FrameBeginInfo::default()).unwrap();
        slots.push(frame.current_slot());
        images.push(frame.image_index());

        let viewport = rhi.swapchain().viewport();
        let scissor = rhi.swapchain().scissor();

        let list = rhi.graphics_queue().command_list(frame.current_slot()).unwrap();
        list.begin().unwrap();
        render_pass
            .execute(list, &*framebuffer, frame.image_index(), &mut |cmd| {
                cmd.set_viewport(viewport)?;
                cmd.set_scissor(scissor)?;
                pipeline.bind(cmd)?;
                cmd.bind_vertex_buffer(&*vertex_buffer)?;
                cmd.bind_index_buffer(&*index_buffer)?;
                cmd.draw_indexed(36, 1, 0, 0, 0)
            })
            .unwrap();
        list.end().unwrap();

        let id = list.id();
        frame.add_command_list(id);
        rhi.submit_frame(frame).unwrap();
    }

    assert_eq!(slots, vec![0, 1, 0, 1, 0]);
    // Each acquired index is a valid image; the sequence need not match the
    // slot sequence
    assert!(images.iter().all(|&image| image < 2));
    assert_eq!(images.len(), 5);
}
