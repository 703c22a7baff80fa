use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use tfidf_recommender::{
    Candidate, Corpus, IndexerConfig, RecommendationService, ServiceConfig, VectorSpaceIndexer,
};

const SKILLS: &[&str] = &[
    "python", "pandas", "java", "spring", "kotlin", "react", "angular", "docker", "kubernetes",
    "terraform", "sql", "postgres", "oracle", "sap", "abap", "scrum", "kanban", "jira", "aws",
    "azure", "spark", "hadoop", "flask", "django", "node", "typescript", "golang", "rust",
    "tableau", "excel", "linux", "redes", "suporte", "infraestrutura", "testes", "selenium",
];

const ROLES: &[&str] = &[
    "desenvolvedor", "analista", "engenheiro", "consultor", "gerente", "arquiteto", "coordenador",
];

// xorshift, so runs are comparable
fn synthetic_resumes(n: usize) -> Vec<String> {
    let mut state = 0x9E37_79B9_7F4A_7C15u64;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state as usize
    };
    (0..n)
        .map(|_| {
            let mut words = vec![ROLES[next() % ROLES.len()].to_string()];
            for _ in 0..40 {
                words.push(SKILLS[next() % SKILLS.len()].to_string());
            }
            words.push(format!("{} anos de experiência", next() % 15));
            words.join(" ")
        })
        .collect()
}

fn fit_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit");
    for n in [100usize, 1_000, 5_000] {
        let resumes = synthetic_resumes(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &resumes, |b, resumes| {
            let indexer: VectorSpaceIndexer = VectorSpaceIndexer::new(IndexerConfig::default()).unwrap();
            b.iter(|| indexer.fit_space(resumes).unwrap());
        });
    }
    group.finish();
}

fn recommend_benchmark(c: &mut Criterion) {
    let corpus: Corpus = synthetic_resumes(5_000)
        .into_iter()
        .enumerate()
        .map(|(i, resume)| Candidate::new(i.to_string(), format!("candidato {i}"), resume))
        .collect();
    let service: RecommendationService = RecommendationService::new(ServiceConfig::default()).unwrap();
    service.fitted(&corpus).unwrap();

    let description = "vaga para desenvolvedor python com pandas, flask e docker em ambiente aws";
    c.bench_function("recommend_cached_5000", |b| {
        b.iter(|| service.recommend(&corpus, description, 10).unwrap());
    });
}

criterion_group!(benches, fit_benchmark, recommend_benchmark);
criterion_main!(benches);
