/// Property-based tests using proptest
/// Tests invariants that should hold for all inputs
use osint_leads_api::batch::BatchOrchestrator;
use osint_leads_api::config::MalformedResponsePolicy;
use osint_leads_api::csv_io::read_import_rows;
use osint_leads_api::enrichment::{parse_model_output, strip_code_fences};
use osint_leads_api::models::{EnrichmentResult, Lead};
use proptest::prelude::*;

// Property: parsing model output never panics and the blank policy never fails
proptest! {
    #[test]
    fn model_output_parsing_never_panics(text in "\\PC*") {
        let _ = parse_model_output(Some(&text), MalformedResponsePolicy::Fail);
        prop_assert!(parse_model_output(Some(&text), MalformedResponsePolicy::Blank).is_ok());
    }

    #[test]
    fn fenced_objects_parse_like_bare_ones(empresa in "[A-Za-z ]{0,30}", lang in "(json)?") {
        let body = serde_json::json!({ "Empresa": empresa }).to_string();
        let fenced = format!("```{}\n{}\n```", lang, body);

        let bare = parse_model_output(Some(&body), MalformedResponsePolicy::Fail).unwrap();
        let unfenced = parse_model_output(Some(&fenced), MalformedResponsePolicy::Fail).unwrap();
        prop_assert_eq!(bare, unfenced);
        prop_assert_eq!(strip_code_fences(&fenced), body.as_str());
    }
}

// Property: import rows are never blank and join cells with ", "
proptest! {
    #[test]
    fn import_rows_never_panic(input in "\\PC*") {
        let _ = read_import_rows(input.as_bytes());
    }

    #[test]
    fn import_rows_join_cells(cells in proptest::collection::vec("[A-Za-z0-9 ]{1,12}", 1..6)) {
        let line = cells.join(",");
        let rows = read_import_rows(format!("{}\n\n", line).as_bytes()).unwrap();
        prop_assert_eq!(rows, vec![cells.join(", ")]);
    }
}

// Property: search is case-insensitive and the empty term matches everything
proptest! {
    #[test]
    fn search_ignores_case(empresa in "[A-Za-z]{1,20}") {
        let lead = Lead {
            id: 1,
            input_data: String::new(),
            nome_sobrenome: String::new(),
            cargo: String::new(),
            empresa: empresa.clone(),
            site: String::new(),
            email_1: String::new(),
            email_2: String::new(),
            email_3: String::new(),
            telefone_1: String::new(),
            telefone_2: String::new(),
            telefone_3_lusha: String::new(),
            telefone_4_apollo: String::new(),
            telefone_5_google: String::new(),
            telefone_assertiva: String::new(),
            whatsapp: String::new(),
            regioes_administrativas_cidade: String::new(),
            estado: String::new(),
            pais: String::new(),
            segmento: String::new(),
            empresa_media_colaboradores: String::new(),
            linkedin_contato: String::new(),
            linkedin_empresa: String::new(),
            insight: String::new(),
            sugestao_abordagem: String::new(),
            created_at: chrono::Utc::now(),
        };
        prop_assert!(lead.matches(&empresa.to_uppercase()));
        prop_assert!(lead.matches(&empresa.to_lowercase()));
        prop_assert!(lead.matches(""));
        prop_assert_eq!(lead.enrichment(), EnrichmentResult { empresa, ..Default::default() });
    }

    #[test]
    fn orchestrator_concurrency_is_never_zero(n in 0usize..64) {
        prop_assert!(BatchOrchestrator::with_concurrency(n).concurrency() >= 1);
    }
}
