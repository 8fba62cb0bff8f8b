use std::cell::RefCell;
use std::rc::Rc;
use wgpu::util::DeviceExt;
use winit::{
    event::*,
    event_loop::EventLoop,
    keyboard::{Key, NamedKey},
    window::WindowBuilder,
};

use bottle_core::{
    BottleConfig, BottleWidget, Clock, Frame, LogHaptics, PointerEvent, SparkleInstance, Stats,
    SystemClock, BOTTLE_HEIGHT, BOTTLE_WIDTH, BOTTLE_WGSL, SPARKLE_CAP,
};

// Share of the window the bottle may use, leaving room for the glow
const FIT_WIDTH: f32 = BOTTLE_WIDTH * 2.5;
const FIT_HEIGHT: f32 = BOTTLE_HEIGHT * 1.3;

/// Placement of the bottle-local box inside the window, in physical pixels.
#[derive(Clone, Copy, Debug)]
struct BottleLayout {
    origin: [f32; 2],
    scale: f32,
}

impl BottleLayout {
    fn fit(width: u32, height: u32) -> Self {
        let (w, h) = (width.max(1) as f32, height.max(1) as f32);
        let scale = (w / FIT_WIDTH).min(h / FIT_HEIGHT);
        Self {
            origin: [
                (w - BOTTLE_WIDTH * scale) * 0.5,
                (h - BOTTLE_HEIGHT * scale) * 0.5,
            ],
            scale,
        }
    }

    fn to_local(&self, px: f64, py: f64) -> [f32; 2] {
        [
            (px as f32 - self.origin[0]) / self.scale,
            (py as f32 - self.origin[1]) / self.scale,
        ]
    }

    fn contains(&self, px: f64, py: f64) -> bool {
        let [x, y] = self.to_local(px, py);
        (0.0..=BOTTLE_WIDTH).contains(&x) && (0.0..=BOTTLE_HEIGHT).contains(&y)
    }
}

struct GpuState<'w> {
    window: &'w winit::window::Window,
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    scene_pipeline: wgpu::RenderPipeline,
    sparkle_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    quad_vb: wgpu::Buffer,
    instance_vb: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    layout: BottleLayout,
}

impl<'w> GpuState<'w> {
    async fn new(window: &'w winit::window::Window) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window)?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No GPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .first()
            .copied()
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            desired_maximum_frame_latency: 2,
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("bottle"),
            source: wgpu::ShaderSource::Wgsl(BOTTLE_WGSL.into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("scene_uniforms"),
            size: std::mem::size_of::<bottle_core::SceneUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        // Unit quad centred on the origin, two triangles
        let quad_vertices: [f32; 12] = [
            -0.5, -0.5, 0.5, -0.5, 0.5, 0.5, -0.5, -0.5, 0.5, 0.5, -0.5, 0.5,
        ];
        let quad_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad_vb"),
            contents: bytemuck::cast_slice(&quad_vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let instance_vb = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("sparkle_vb"),
            size: (std::mem::size_of::<SparkleInstance>() * SPARKLE_CAP) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("bg"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pl"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let sparkle_buffers = [
            // slot 0: quad corners
            wgpu::VertexBufferLayout {
                array_stride: (std::mem::size_of::<f32>() * 2) as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: 0,
                    shader_location: 0,
                }],
            },
            // slot 1: per-sparkle data
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<SparkleInstance>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &[
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x2,
                        offset: 0,
                        shader_location: 1,
                    },
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32,
                        offset: 8,
                        shader_location: 2,
                    },
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32,
                        offset: 12,
                        shader_location: 3,
                    },
                ],
            },
        ];

        let scene_pipeline = build_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            format,
            ("vs_scene", "fs_scene"),
            &[],
            None,
        );
        let sparkle_pipeline = build_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            format,
            ("vs_sparkle", "fs_sparkle"),
            &sparkle_buffers,
            Some(wgpu::BlendState::ALPHA_BLENDING),
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            scene_pipeline,
            sparkle_pipeline,
            uniform_buffer,
            quad_vb,
            instance_vb,
            bind_group,
            layout: BottleLayout::fit(size.width, size.height),
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.layout = BottleLayout::fit(new_size.width, new_size.height);
    }

    fn render(&mut self, frame: &Frame) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let uniforms = frame.uniforms(
            self.layout.origin,
            self.layout.scale,
            [self.config.width as f32, self.config.height as f32],
        );
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let instances = frame.sparkle_instances();
        if !instances.is_empty() {
            self.queue
                .write_buffer(&self.instance_vb, 0, bytemuck::cast_slice(instances.as_slice()));
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("rpass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.5,
                            g: 0.5,
                            b: 0.5,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_bind_group(0, &self.bind_group, &[]);
            rpass.set_pipeline(&self.scene_pipeline);
            rpass.draw(0..3, 0..1);
            if !instances.is_empty() {
                rpass.set_pipeline(&self.sparkle_pipeline);
                rpass.set_vertex_buffer(0, self.quad_vb.slice(..));
                rpass.set_vertex_buffer(1, self.instance_vb.slice(..));
                rpass.draw(0..6, 0..instances.len() as u32);
            }
        }
        self.queue.submit(Some(encoder.finish()));
        output.present();
        Ok(())
    }
}

fn build_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    (vs, fs): (&str, &str),
    buffers: &[wgpu::VertexBufferLayout],
    blend: Option<wgpu::BlendState>,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(vs),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(vs),
            buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fs),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        cache: None,
        multiview: None,
    })
}

fn config_from_env() -> BottleConfig {
    let mut config = BottleConfig::default();
    if let Ok(raw) = std::env::var("BOTTLE_MAX_QUANTITY") {
        match raw.parse::<f32>() {
            Ok(max) => config = config.with_max_quantity(max),
            Err(e) => log::warn!("ignoring BOTTLE_MAX_QUANTITY={raw:?}: {e}"),
        }
    }
    if let Ok(raw) = std::env::var("BOTTLE_SEED") {
        match raw.parse::<u64>() {
            Ok(seed) => config = config.with_seed(seed),
            Err(e) => log::warn!("ignoring BOTTLE_SEED={raw:?}: {e}"),
        }
    }
    config
}

fn title_for(stats: &Stats) -> String {
    format!(
        "Eat: {} ml ({}%, {} ml left)",
        stats.display_value, stats.progress_percent, stats.remaining
    )
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let clock = SystemClock::new();
    let mut widget = BottleWidget::new(config_from_env(), LogHaptics)?;

    // Latest stats published by the widget; the title follows them
    let latest_stats: Rc<RefCell<Option<Stats>>> = Rc::new(RefCell::new(None));
    {
        let slot = latest_stats.clone();
        widget.subscribe(move |frame: &Frame| {
            *slot.borrow_mut() = Some(frame.stats);
        });
    }

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title(title_for(&widget.quantity().stats()))
        .with_inner_size(winit::dpi::LogicalSize::new(480.0, 640.0))
        .build(&event_loop)?;

    let mut state = pollster::block_on(GpuState::new(&window))?;
    widget.appear(clock.now());

    let mut cursor = (0.0_f64, 0.0_f64);
    let mut shown_stats: Option<Stats> = None;

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::Resized(size) => state.resize(size),
            WindowEvent::CloseRequested => {
                widget.teardown();
                elwt.exit();
            }
            WindowEvent::CursorMoved { position, .. } => {
                cursor = (position.x, position.y);
                if widget.is_dragging() {
                    let [_, y] = state.layout.to_local(cursor.0, cursor.1);
                    widget.handle_pointer(PointerEvent::Move { y });
                }
            }
            WindowEvent::MouseInput {
                state: button_state,
                button: MouseButton::Left,
                ..
            } => match button_state {
                ElementState::Pressed if state.layout.contains(cursor.0, cursor.1) => {
                    let [_, y] = state.layout.to_local(cursor.0, cursor.1);
                    widget.handle_pointer(PointerEvent::Begin { y });
                }
                ElementState::Released => widget.handle_pointer(PointerEvent::End),
                _ => {}
            },
            WindowEvent::Touch(touch) => {
                let (px, py) = (touch.location.x, touch.location.y);
                let [_, y] = state.layout.to_local(px, py);
                match touch.phase {
                    TouchPhase::Started if state.layout.contains(px, py) => {
                        widget.handle_pointer(PointerEvent::Begin { y })
                    }
                    TouchPhase::Moved => widget.handle_pointer(PointerEvent::Move { y }),
                    TouchPhase::Ended | TouchPhase::Cancelled => {
                        widget.handle_pointer(PointerEvent::End)
                    }
                    _ => {}
                }
            }
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                match event.logical_key {
                    Key::Named(NamedKey::ArrowUp) if widget.can_increment() => widget.increment(),
                    Key::Named(NamedKey::ArrowDown) if widget.can_decrement() => {
                        widget.decrement()
                    }
                    Key::Named(NamedKey::Escape) => {
                        widget.teardown();
                        elwt.exit();
                    }
                    Key::Character(ref c) => match c.as_str() {
                        "+" | "=" if widget.can_increment() => widget.increment(),
                        "-" if widget.can_decrement() => widget.decrement(),
                        _ => {}
                    },
                    _ => {}
                }
            }
            _ => {}
        },
        Event::AboutToWait => {
            if !widget.is_alive() {
                return;
            }
            let now = clock.now();
            widget.tick(now);

            let latest = *latest_stats.borrow();
            if latest.is_some() && latest != shown_stats {
                if let Some(stats) = latest {
                    state.window.set_title(&title_for(&stats));
                }
                shown_stats = latest;
            }

            match state.render(&widget.frame(now)) {
                Ok(_) => state.window.request_redraw(),
                Err(wgpu::SurfaceError::Lost) => state.resize(state.window.inner_size()),
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    widget.teardown();
                    elwt.exit();
                }
                Err(e) => log::warn!("surface error: {e:?}"),
            }
        }
        _ => {}
    })?;
    Ok(())
}
