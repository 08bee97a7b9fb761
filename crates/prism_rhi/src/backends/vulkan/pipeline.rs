//! Shader modules and graphics pipelines

use ash::{vk, Device};
use std::ffi::CString;

use crate::backends::vulkan::{
    to_vk_attribute_format, to_vk_cull_mode, to_vk_input_rate, to_vk_shader_stage, BACKEND,
};
use crate::rhi::{
    RhiCommandList, RhiError, RhiPipeline, RhiPipelineCreateInfo, RhiResult,
};

/// Wrapped precompiled shader bytecode with RAII cleanup
pub struct VulkanShaderModule {
    device: Device,
    module: vk::ShaderModule,
}

impl VulkanShaderModule {
    /// Create a shader module from SPIR-V bytecode
    pub fn from_bytes(device: Device, bytes: &[u8]) -> RhiResult<Self> {
        // SPIR-V words are u32-aligned
        let (prefix, words, suffix) = unsafe { bytes.align_to::<u32>() };
        if !prefix.is_empty() || !suffix.is_empty() {
            return Err(RhiError::UnsupportedValue {
                what: "shader bytecode",
                value: format!("{} bytes, not u32-aligned", bytes.len()),
            });
        }

        let create_info = vk::ShaderModuleCreateInfo::builder().code(words);

        let module = unsafe { device.create_shader_module(&create_info, None) }
            .map_err(|e| RhiError::backend(BACKEND, "vkCreateShaderModule", e))?;

        Ok(Self { device, module })
    }

    pub fn handle(&self) -> vk::ShaderModule {
        self.module
    }
}

impl Drop for VulkanShaderModule {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_shader_module(self.module, None);
        }
    }
}

/// Graphics pipeline with RAII cleanup.
///
/// Viewport and scissor are dynamic state, so the swapchain's cached values
/// apply at record time rather than baking an extent into the pipeline.
pub struct VulkanPipeline {
    device: Device,
    pipeline: vk::Pipeline,
    layout: vk::PipelineLayout,
}

impl VulkanPipeline {
    pub fn new(device: Device, info: &RhiPipelineCreateInfo) -> RhiResult<Self> {
        let render_pass = info.render_pass.as_vulkan().ok_or_else(|| {
            RhiError::invalid_state("pipeline render pass is not a Vulkan render pass")
        })?;
        if info.blend_states.len() as u32 != render_pass.color_attachment_count() {
            return Err(RhiError::invalid_state(format!(
                "{} blend states for {} color attachments",
                info.blend_states.len(),
                render_pass.color_attachment_count()
            )));
        }

        // Shader stages; modules and entry point strings must outlive
        // pipeline creation
        let modules: RhiResult<Vec<(VulkanShaderModule, CString, vk::ShaderStageFlags)>> = info
            .shader_stages
            .iter()
            .map(|stage| {
                let module = VulkanShaderModule::from_bytes(device.clone(), stage.bytecode)?;
                let entry_point =
                    CString::new(stage.entry_point).map_err(|_| RhiError::UnsupportedValue {
                        what: "shader entry point",
                        value: stage.entry_point.to_string(),
                    })?;
                Ok((module, entry_point, to_vk_shader_stage(stage.stage)))
            })
            .collect();
        let modules = modules?;

        let shader_stages: Vec<vk::PipelineShaderStageCreateInfo> = modules
            .iter()
            .map(|(module, entry_point, stage)| {
                vk::PipelineShaderStageCreateInfo::builder()
                    .stage(*stage)
                    .module(module.handle())
                    .name(entry_point)
                    .build()
            })
            .collect();

        // Vertex layout from the config descriptors
        let binding_descriptions: Vec<vk::VertexInputBindingDescription> = info
            .vertex_bindings
            .iter()
            .map(|binding| vk::VertexInputBindingDescription {
                binding: binding.binding,
                stride: binding.stride,
                input_rate: to_vk_input_rate(binding.input_rate),
            })
            .collect();

        let attribute_descriptions: RhiResult<Vec<vk::VertexInputAttributeDescription>> = info
            .vertex_attributes
            .iter()
            .map(|attribute| {
                Ok(vk::VertexInputAttributeDescription {
                    location: attribute.location,
                    binding: attribute.binding,
                    format: to_vk_attribute_format(attribute.format)?,
                    offset: attribute.offset,
                })
            })
            .collect();
        let attribute_descriptions = attribute_descriptions?;

        let vertex_input = vk::PipelineVertexInputStateCreateInfo::builder()
            .vertex_binding_descriptions(&binding_descriptions)
            .vertex_attribute_descriptions(&attribute_descriptions);

        let input_assembly = vk::PipelineInputAssemblyStateCreateInfo::builder()
            .topology(vk::PrimitiveTopology::TRIANGLE_LIST)
            .primitive_restart_enable(false);

        // Dynamic viewport/scissor; only the counts are baked in
        let viewport_state = vk::PipelineViewportStateCreateInfo::builder()
            .viewport_count(1)
            .scissor_count(1);

        let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
        let dynamic_state =
            vk::PipelineDynamicStateCreateInfo::builder().dynamic_states(&dynamic_states);

        let rasterizer = vk::PipelineRasterizationStateCreateInfo::builder()
            .depth_clamp_enable(false)
            .rasterizer_discard_enable(false)
            .polygon_mode(vk::PolygonMode::FILL)
            .line_width(1.0)
            .cull_mode(to_vk_cull_mode(info.cull_mode))
            // Flipped viewport keeps counter-clockwise winding front-facing
            .front_face(vk::FrontFace::COUNTER_CLOCKWISE)
            .depth_bias_enable(false);

        let multisampling = vk::PipelineMultisampleStateCreateInfo::builder()
            .sample_shading_enable(false)
            .rasterization_samples(vk::SampleCountFlags::TYPE_1);

        let depth_stencil = vk::PipelineDepthStencilStateCreateInfo::builder()
            .depth_test_enable(info.render_pass.has_depth_attachment())
            .depth_write_enable(info.render_pass.has_depth_attachment())
            .depth_compare_op(vk::CompareOp::LESS)
            .depth_bounds_test_enable(false)
            .stencil_test_enable(false);

        let color_blend_attachments: Vec<vk::PipelineColorBlendAttachmentState> = info
            .blend_states
            .iter()
            .map(|state| {
                vk::PipelineColorBlendAttachmentState::builder()
                    .color_write_mask(vk::ColorComponentFlags::RGBA)
                    .blend_enable(state.blend_enable)
                    .src_color_blend_factor(vk::BlendFactor::SRC_ALPHA)
                    .dst_color_blend_factor(vk::BlendFactor::ONE_MINUS_SRC_ALPHA)
                    .color_blend_op(vk::BlendOp::ADD)
                    .src_alpha_blend_factor(vk::BlendFactor::ONE)
                    .dst_alpha_blend_factor(vk::BlendFactor::ZERO)
                    .alpha_blend_op(vk::BlendOp::ADD)
                    .build()
            })
            .collect();

        let color_blending = vk::PipelineColorBlendStateCreateInfo::builder()
            .logic_op_enable(false)
            .attachments(&color_blend_attachments);

        // No descriptor sets or push constants yet
        let layout_info = vk::PipelineLayoutCreateInfo::builder();
        let layout = unsafe { device.create_pipeline_layout(&layout_info, None) }
            .map_err(|e| RhiError::backend(BACKEND, "vkCreatePipelineLayout", e))?;

        let pipeline_info = vk::GraphicsPipelineCreateInfo::builder()
            .stages(&shader_stages)
            .vertex_input_state(&vertex_input)
            .input_assembly_state(&input_assembly)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterizer)
            .multisample_state(&multisampling)
            .depth_stencil_state(&depth_stencil)
            .color_blend_state(&color_blending)
            .dynamic_state(&dynamic_state)
            .layout(layout)
            .render_pass(render_pass.handle())
            .subpass(0);

        let pipelines = unsafe {
            device.create_graphics_pipelines(
                vk::PipelineCache::null(),
                &[pipeline_info.build()],
                None,
            )
        }
        .map_err(|(_, e)| RhiError::backend(BACKEND, "vkCreateGraphicsPipelines", e));
        let pipelines = match pipelines {
            Ok(pipelines) => pipelines,
            Err(e) => {
                unsafe { device.destroy_pipeline_layout(layout, None) };
                return Err(e);
            }
        };
        let Some(&pipeline) = pipelines.first() else {
            unsafe { device.destroy_pipeline_layout(layout, None) };
            return Err(RhiError::backend(
                BACKEND,
                "vkCreateGraphicsPipelines",
                "no pipeline returned",
            ));
        };

        log::debug!("created pipeline '{}'", info.debug_name);

        Ok(Self {
            device,
            pipeline,
            layout,
        })
    }

    pub fn handle(&self) -> vk::Pipeline {
        self.pipeline
    }

    pub fn layout(&self) -> vk::PipelineLayout {
        self.layout
    }
}

impl RhiPipeline for VulkanPipeline {
    fn bind(&self, command_list: &mut dyn RhiCommandList) -> RhiResult<()> {
        let list = command_list.as_vulkan().ok_or_else(|| {
            RhiError::invalid_state("pipeline bind: command list is not a Vulkan list")
        })?;
        list.record_state().require_recording("pipeline bind")?;
        unsafe {
            list.device().cmd_bind_pipeline(
                list.handle(),
                vk::PipelineBindPoint::GRAPHICS,
                self.pipeline,
            );
        }
        Ok(())
    }

    fn as_vulkan(&self) -> Option<&VulkanPipeline> {
        Some(self)
    }
}

impl Drop for VulkanPipeline {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_pipeline(self.pipeline, None);
            self.device.destroy_pipeline_layout(self.layout, None);
        }
    }
}
