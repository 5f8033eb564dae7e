// Copyright Materialize, Inc. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository, or online at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use criterion::{criterion_group, criterion_main, Criterion};
use rand::{thread_rng, Rng};

use decfix::Numeric;

pub fn bench_arith(c: &mut Criterion) {
    let mut rng = thread_rng();
    let a = Numeric::from(rng.gen::<i64>());
    let b = Numeric::from(rng.gen_range(1i64, 1_000_000_000));
    c.bench_function("add", |bench| bench.iter(|| a.checked_add(&b)));
    c.bench_function("mul", |bench| bench.iter(|| a.checked_mul(&b)));
    c.bench_function("div", |bench| bench.iter(|| a.checked_div(&b)));
}

pub fn bench_convert(c: &mut Criterion) {
    let mut rng = thread_rng();
    let n = Numeric::from(rng.gen::<i64>());
    let s = n.to_string();
    c.bench_function("to_string", |bench| bench.iter(|| n.to_string()));
    c.bench_function("parse", |bench| bench.iter(|| s.parse::<Numeric>()));
}

criterion_group!(benches, bench_arith, bench_convert);
criterion_main!(benches);
