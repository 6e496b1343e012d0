//! Benchmarks the shape-changing transforms of a raster.
use brunch::Bench;

use image_raster::{Filter, Raster};

#[derive(Clone, Copy, Debug)]
enum Op {
    Resize(Filter),
    Crop,
    Border,
    Stamp,
    Layers,
}

struct Transform {
    op: Op,
    sz: usize,
    channels: usize,
}

impl Transform {
    fn name(&self) -> String {
        format!("{:?}({}x{}x{})", self.op, self.sz, self.sz, self.channels)
    }

    fn prepare(self) -> impl FnMut() -> Raster {
        let source = Raster::filled(self.sz, self.sz, self.channels, 0x80);
        let patch = Raster::filled(self.sz / 2, self.sz / 2, self.channels, 0x00);
        let sz = self.sz;

        move || {
            let mut image = source.clone();
            match self.op {
                Op::Resize(filter) => image.resize_with(sz / 2 + 1, sz / 3 + 1, filter),
                Op::Crop => image.center_crop(sz / 2, sz / 2).expect("center is inside"),
                Op::Border => image.add_box_border(16, 0xff),
                Op::Stamp => image.stamp(&patch, (sz / 3) as isize, -((sz / 8) as isize)),
                Op::Layers => return image.layer(0),
            }
            image
        }
    }
}

fn main() {
    let tests = [
        Transform {
            op: Op::Resize(Filter::Nearest),
            sz: 256,
            channels: 3,
        },
        Transform {
            op: Op::Resize(Filter::CatmullRom),
            sz: 256,
            channels: 3,
        },
        Transform {
            op: Op::Resize(Filter::Lanczos3),
            sz: 256,
            channels: 4,
        },
        Transform {
            op: Op::Crop,
            sz: 512,
            channels: 3,
        },
        Transform {
            op: Op::Border,
            sz: 512,
            channels: 3,
        },
        Transform {
            op: Op::Stamp,
            sz: 512,
            channels: 3,
        },
        Transform {
            op: Op::Layers,
            sz: 512,
            channels: 4,
        },
    ];

    let mut benches = brunch::Benches::default();
    benches.extend(tests.map(|transform| {
        Bench::new(format!("raster::transform::{}", transform.name())).run(transform.prepare())
    }));
    benches.finish();
}
