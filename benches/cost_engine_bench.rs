//! Benchmarks for validation, memory accounting, and the local predictor.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use npu_cost_model::predictor::local::LocalPredictor;
use npu_cost_model::{
    ActivationFunction, CostEngine, DataType, Device, ExecutionMode, ISIStrategy, Kernel, Layout,
    MpeEngine, Operation, Padding, Stride, Swizzling,
};
use npu_cost_model::tensor::Tensor;
use npu_cost_model::validator;
use npu_cost_model::workload::OperationRecord;
use npu_cost_model::Workload;

fn conv_workload(channels: u32) -> Workload {
    Workload {
        device: Device::Gen2_7,
        op: Operation::Conv,
        input_0: Tensor::new([56, 56, channels, 1], DataType::U8, Layout::Zxy, false).unwrap(),
        output_0: Tensor::new([56, 56, channels, 1], DataType::U8, Layout::Zxy, false).unwrap(),
        kernel: Kernel { h: 3, w: 3 },
        stride: Stride { h: 1, w: 1 },
        pad: Padding { top: 1, bottom: 1, left: 1, right: 1 },
        exec_mode: ExecutionMode::Cuboid16x16,
        act_fn: ActivationFunction::None,
        act_sparsity: 0.0,
        weight_sparsity: 0.0,
        input_swizzling: [Swizzling::Key0, Swizzling::Key0],
        output_swizzling: [Swizzling::Key0],
        output_write_tiles: 1,
        isi_strategy: ISIStrategy::Clustering,
        weight_sparsity_enabled: false,
        halo: Default::default(),
        sep: Default::default(),
        weight_type: None,
        weightless_op: None,
        in_place_output: None,
        superdense: None,
        input_autopad: None,
        output_autopad: None,
        mpe_engine: MpeEngine::Default,
        reduce_minmax_op: false,
        offsets: [0; 4],
        layer_info: String::new(),
    }
}

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate");

    for &channels in &[16u32, 64, 256] {
        let record = OperationRecord::from_workload(&conv_workload(channels));
        let limits = Device::Gen2_7.limits();
        group.throughput(Throughput::Elements(1));

        group.bench_function(format!("{}_channels", channels), |b| {
            b.iter(|| {
                let report = validator::validate(black_box(&record), black_box(&limits));
                black_box(report)
            })
        });
    }

    group.finish();
}

fn bench_cost_engine(c: &mut Criterion) {
    let engine = CostEngine::new(LocalPredictor::new());
    let workload = conv_workload(64);

    c.bench_function("cost_full_pipeline", |b| {
        b.iter(|| {
            let result = engine.cost(black_box(&workload));
            black_box(result)
        })
    });
}

fn bench_fingerprint(c: &mut Criterion) {
    let record = OperationRecord::from_workload(&conv_workload(64));

    c.bench_function("fingerprint", |b| {
        b.iter(|| black_box(record.fingerprint()))
    });
}

criterion_group!(benches, bench_validate, bench_cost_engine, bench_fingerprint);
criterion_main!(benches);
