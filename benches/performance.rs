// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nalgebra::Vector3;
use polyframe_brep::{BooleanOp, Kernel, Primitive};

fn bench_repair(c: &mut Criterion) {
    let mut group = c.benchmark_group("repair");
    let kernel = Kernel::default();

    for segments in [16u32, 32, 64] {
        let mut sphere = Primitive::sphere(10.0, segments).to_mesh();
        // One hole and one flipped face to keep every stage busy
        sphere.triangles.remove(0);
        let last = sphere.triangles.len() - 1;
        sphere.triangles[last] = sphere.triangles[last].flipped();

        group.bench_with_input(BenchmarkId::new("sphere", segments), &sphere, |b, mesh| {
            b.iter(|| kernel.repair(black_box(mesh)));
        });
        group.bench_with_input(BenchmarkId::new("validate", segments), &sphere, |b, mesh| {
            b.iter(|| kernel.validate(black_box(mesh)));
        });
    }

    group.finish();
}

fn bench_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("bsp_tree");
    let kernel = Kernel::default();

    for segments in [16u32, 32] {
        let sphere = Primitive::sphere(10.0, segments).to_mesh();
        group.bench_with_input(BenchmarkId::new("sphere", segments), &sphere, |b, mesh| {
            b.iter(|| kernel.build_tree(black_box(mesh)));
        });
    }

    group.finish();
}

fn bench_boolean_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("boolean_ops");
    group.sample_size(20);
    let kernel = Kernel::default();

    let cube1 = Primitive::cube(Vector3::new(10.0, 10.0, 10.0), false).to_mesh();
    let cube2 = cube1.translated(Vector3::new(5.0, 2.5, 0.0));
    let sphere = Primitive::sphere(6.0, 16)
        .to_mesh()
        .translated(Vector3::new(10.0, 10.0, 10.0));

    for op in BooleanOp::ALL {
        group.bench_function(BenchmarkId::new("cubes", op), |b| {
            b.iter(|| kernel.boolean(op, black_box(&cube1), black_box(&cube2)).unwrap());
        });
        group.bench_function(BenchmarkId::new("cube_sphere", op), |b| {
            b.iter(|| kernel.boolean(op, black_box(&cube1), black_box(&sphere)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_repair, bench_tree, bench_boolean_ops);
criterion_main!(benches);
