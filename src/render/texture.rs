pub struct Texture2DPackage {
    #[allow(dead_code)]
    pub gpu_texture: wgpu::Texture,
    pub gpu_texture_view: wgpu::TextureView,
    pub gpu_sampler: wgpu::Sampler,
}

const LIGHT_TEXEL: [u8; 4] = [230, 230, 230, 255];
const DARK_TEXEL: [u8; 4] = [40, 90, 160, 255];

impl Texture2DPackage {
    pub fn checkerboard(
        name: &str,
        dimension: u32,
        tiles: u32,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Self {
        let dimension = dimension.max(1);
        let size = wgpu::Extent3d {
            width: dimension,
            height: dimension,
            depth_or_array_layers: 1,
        };

        let texels = checkerboard_texels(dimension, tiles);

        let gpu_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(name),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &gpu_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &texels,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * dimension),
                rows_per_image: Some(dimension),
            },
            size,
        );

        let gpu_texture_view = gpu_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let gpu_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{name}_SAMPLER")),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            gpu_texture,
            gpu_texture_view,
            gpu_sampler,
        }
    }
}

fn checkerboard_texels(dimension: u32, tiles: u32) -> Vec<u8> {
    let tile_size = (dimension / tiles.max(1)).max(1);

    (0..dimension)
        .flat_map(|y| (0..dimension).map(move |x| (x, y)))
        .flat_map(|(x, y)| match (x / tile_size + y / tile_size) % 2 {
            0 => LIGHT_TEXEL,
            _ => DARK_TEXEL,
        })
        .collect()
}
