//! Tutor service: teaching the knowledge base and answering questions.

use std::future::Future;
use std::time::Duration;

use crate::ai::{
    build_tutor_prompt, AiError, AiProvider, GenerationBackend, ImageInput,
    IMAGE_LEARNING_PROMPT,
};
use crate::config::AppConfig;
use crate::error::TutorError;
use crate::knowledge::{KnowledgeEntry, KnowledgeStore};

const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Ties the knowledge store to the generation service.
///
/// Cheap to clone; clones share the same store and backend.
#[derive(Debug, Clone)]
pub struct Tutor {
    store: KnowledgeStore,
    backend: GenerationBackend,
    admin_password: Option<String>,
    image_learning: bool,
    generation_timeout: Duration,
}

impl Tutor {
    /// Create a tutor with no admin password, image learning enabled and
    /// the default generation timeout.
    #[must_use]
    pub fn new(store: KnowledgeStore, backend: GenerationBackend) -> Self {
        Self {
            store,
            backend,
            admin_password: None,
            image_learning: true,
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }

    /// Build a tutor from configuration, resolving secrets from the environment.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        let admin_password = std::env::var(&config.tutor.admin_password_env)
            .ok()
            .filter(|p| !p.is_empty());
        if admin_password.is_none() {
            tracing::warn!(
                env = %config.tutor.admin_password_env,
                "Admin password not set, admin login and learning are disabled"
            );
        }

        Self::new(
            KnowledgeStore::new(),
            GenerationBackend::from_config(config.ai.clone()),
        )
        .with_admin_password(admin_password)
        .with_image_learning(config.tutor.image_learning)
        .with_generation_timeout(config.tutor.generation_timeout())
    }

    #[must_use]
    pub fn with_admin_password(mut self, password: Option<String>) -> Self {
        self.admin_password = password;
        self
    }

    #[must_use]
    pub fn with_image_learning(mut self, enabled: bool) -> Self {
        self.image_learning = enabled;
        self
    }

    #[must_use]
    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    #[must_use]
    pub fn store(&self) -> &KnowledgeStore {
        &self.store
    }

    #[must_use]
    pub fn backend(&self) -> &GenerationBackend {
        &self.backend
    }

    /// Check a submitted admin password.
    ///
    /// Always false when no admin password is configured.
    #[must_use]
    pub fn check_admin(&self, password: Option<&str>) -> bool {
        match (&self.admin_password, password) {
            (Some(expected), Some(given)) => expected == given,
            _ => false,
        }
    }

    /// Like [`Tutor::check_admin`], as a typed error.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::Auth` when the password does not match.
    pub fn authorize(&self, password: Option<&str>) -> Result<(), TutorError> {
        if self.check_admin(password) {
            Ok(())
        } else {
            Err(TutorError::Auth("Unauthorized Access".to_string()))
        }
    }

    /// Teach the tutor a piece of text.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::Validation` if the text is empty.
    pub async fn learn_text(&self, text: &str) -> Result<(), TutorError> {
        if text.is_empty() {
            return Err(TutorError::Validation("No content provided.".to_string()));
        }
        self.store.append(KnowledgeEntry::from_text(text)).await;
        tracing::info!(chars = text.chars().count(), "Learned from text");
        Ok(())
    }

    /// Teach the tutor from an image by storing the model's summary of it.
    ///
    /// Returns the summary. The store is left untouched on failure.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::Unsupported` if image learning is disabled,
    /// `TutorError::Validation` if the image is empty,
    /// `TutorError::Configuration` if the generation service is unavailable and
    /// `TutorError::Upstream` if the generation call fails or times out.
    pub async fn learn_image(&self, image: &ImageInput) -> Result<String, TutorError> {
        if !self.image_learning {
            return Err(TutorError::Unsupported(
                "Learning from images is not enabled on this server.".to_string(),
            ));
        }
        if image.data.is_empty() {
            return Err(TutorError::Validation("No content provided.".to_string()));
        }
        let provider = self
            .backend
            .provider()
            .map_err(|reason| TutorError::Configuration(reason.to_string()))?;

        let summary = self
            .bounded(
                "Error learning from image",
                provider.generate_with_image(IMAGE_LEARNING_PROMPT, image),
            )
            .await?;

        self.store
            .append(KnowledgeEntry::from_image_summary(&summary))
            .await;
        tracing::info!(
            mime_type = %image.mime_type,
            bytes = image.data.len(),
            "Learned from image"
        );
        Ok(summary)
    }

    /// Answer a question using everything the tutor has learned.
    ///
    /// The model's text is returned verbatim.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::Validation` if the question is blank,
    /// `TutorError::Configuration` if the generation service is unavailable and
    /// `TutorError::Upstream` if the generation call fails or times out.
    pub async fn ask(&self, question: &str) -> Result<String, TutorError> {
        if question.trim().is_empty() {
            return Err(TutorError::Validation("No question provided.".to_string()));
        }
        let provider = self
            .backend
            .provider()
            .map_err(|reason| TutorError::Configuration(reason.to_string()))?;

        // Owned copy; the store lock is released before the network call.
        let context = self.store.render_context().await;
        let prompt = build_tutor_prompt(question, &context);
        tracing::debug!(
            context_chars = context.len(),
            prompt_chars = prompt.len(),
            "Asking generation service"
        );

        self.bounded("AI error", provider.generate(&prompt)).await
    }

    async fn bounded<F>(&self, action: &'static str, call: F) -> Result<String, TutorError>
    where
        F: Future<Output = Result<String, AiError>>,
    {
        match tokio::time::timeout(self.generation_timeout, call).await {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(TutorError::upstream(action, e)),
            Err(_) => Err(TutorError::upstream(action, AiError::Timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;

    /// Records prompts and replies with a fixed answer.
    #[derive(Default)]
    struct RecordingProvider {
        prompts: Mutex<Vec<String>>,
        reply: String,
    }

    impl RecordingProvider {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                prompts: Mutex::new(Vec::new()),
                reply: reply.to_string(),
            })
        }
    }

    #[async_trait]
    impl AiProvider for RecordingProvider {
        async fn generate(&self, prompt: &str) -> Result<String, AiError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }

        async fn generate_with_image(
            &self,
            prompt: &str,
            _image: &ImageInput,
        ) -> Result<String, AiError> {
            self.generate(prompt).await
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl AiProvider for FailingProvider {
        async fn generate(&self, _prompt: &str) -> Result<String, AiError> {
            Err(AiError::RequestFailed("HTTP 503: overloaded".to_string()))
        }

        async fn generate_with_image(
            &self,
            _prompt: &str,
            _image: &ImageInput,
        ) -> Result<String, AiError> {
            Err(AiError::RequestFailed("HTTP 503: overloaded".to_string()))
        }
    }

    struct SlowProvider;

    #[async_trait]
    impl AiProvider for SlowProvider {
        async fn generate(&self, _prompt: &str) -> Result<String, AiError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(String::new())
        }

        async fn generate_with_image(
            &self,
            prompt: &str,
            _image: &ImageInput,
        ) -> Result<String, AiError> {
            self.generate(prompt).await
        }
    }

    /// Blocks inside `generate` until the test releases it.
    #[derive(Default)]
    struct GatedProvider {
        entered: tokio::sync::Notify,
        release: tokio::sync::Notify,
    }

    #[async_trait]
    impl AiProvider for GatedProvider {
        async fn generate(&self, _prompt: &str) -> Result<String, AiError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok("answer".to_string())
        }

        async fn generate_with_image(
            &self,
            prompt: &str,
            _image: &ImageInput,
        ) -> Result<String, AiError> {
            self.generate(prompt).await
        }
    }

    fn tutor_with(provider: Arc<dyn AiProvider>) -> Tutor {
        Tutor::new(KnowledgeStore::new(), GenerationBackend::ready(provider))
            .with_admin_password(Some("secret".to_string()))
    }

    fn png() -> ImageInput {
        ImageInput::new("image/png", vec![0x89, b'P', b'N', b'G'])
    }

    #[test]
    fn test_check_admin() {
        let tutor = tutor_with(RecordingProvider::replying(""));
        assert!(tutor.check_admin(Some("secret")));
        assert!(!tutor.check_admin(Some("wrong")));
        assert!(!tutor.check_admin(None));
        assert!(matches!(
            tutor.authorize(Some("wrong")),
            Err(TutorError::Auth(_))
        ));
    }

    #[test]
    fn test_unset_admin_password_never_matches() {
        let tutor = Tutor::new(KnowledgeStore::new(), GenerationBackend::unavailable("x"));
        assert!(!tutor.check_admin(None));
        assert!(!tutor.check_admin(Some("")));
    }

    #[tokio::test]
    async fn test_ask_embeds_learned_text_and_question() {
        let provider = RecordingProvider::replying("a² + b² = c² ব্যাখ্যা");
        let tutor = tutor_with(provider.clone());

        tutor
            .learn_text("Pythagorean theorem states a²+b²=c².")
            .await
            .unwrap();
        let answer = tutor.ask("What is the Pythagorean theorem?").await.unwrap();

        assert_eq!(answer, "a² + b² = c² ব্যাখ্যা");
        let prompts = provider.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Learned from text: Pythagorean theorem states a²+b²=c²."));
        assert!(prompts[0].contains("What is the Pythagorean theorem?"));
    }

    #[tokio::test]
    async fn test_blank_question_rejected_before_generation() {
        let provider = RecordingProvider::replying("unused");
        let tutor = tutor_with(provider.clone());

        let result = tutor.ask("   ").await;
        assert!(matches!(result, Err(TutorError::Validation(_))));
        assert!(provider.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ask_without_backend_is_configuration_error() {
        let tutor = Tutor::new(
            KnowledgeStore::new(),
            GenerationBackend::unavailable("API key not configured (env: GEMINI_API_KEY)"),
        );
        let result = tutor.ask("What is work?").await;
        assert!(matches!(result, Err(TutorError::Configuration(r)) if r.contains("GEMINI_API_KEY")));
    }

    #[tokio::test]
    async fn test_upstream_failure_keeps_store() {
        let tutor = tutor_with(Arc::new(FailingProvider));
        tutor.learn_text("kept").await.unwrap();

        let err = tutor.ask("q").await.unwrap_err();
        assert!(err.to_string().starts_with("AI error: "));
        assert_eq!(tutor.store().render_context().await, "Learned from text: kept");
    }

    #[tokio::test]
    async fn test_generation_timeout() {
        let tutor = tutor_with(Arc::new(SlowProvider))
            .with_generation_timeout(Duration::from_millis(20));

        let err = tutor.ask("q").await.unwrap_err();
        assert!(matches!(
            err,
            TutorError::Upstream {
                source: AiError::Timeout,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_learn_while_ask_is_generating() {
        let provider = Arc::new(GatedProvider::default());
        let tutor = tutor_with(provider.clone());
        tutor.learn_text("before").await.unwrap();

        let asking = tokio::spawn({
            let tutor = tutor.clone();
            async move { tutor.ask("q").await }
        });
        provider.entered.notified().await;

        tokio::time::timeout(Duration::from_secs(1), tutor.learn_text("during"))
            .await
            .expect("learn_text blocked while ask was generating")
            .unwrap();
        assert_eq!(tutor.store().len().await, 2);

        provider.release.notify_one();
        assert_eq!(asking.await.unwrap().unwrap(), "answer");
    }

    #[tokio::test]
    async fn test_learn_image_appends_summary() {
        let provider = RecordingProvider::replying("Newton's second law: F = ma");
        let tutor = tutor_with(provider.clone());

        let summary = tutor.learn_image(&png()).await.unwrap();

        assert_eq!(summary, "Newton's second law: F = ma");
        assert_eq!(
            tutor.store().render_context().await,
            "Learned from image summary: Newton's second law: F = ma"
        );
        assert_eq!(provider.prompts.lock().unwrap()[0], IMAGE_LEARNING_PROMPT);
    }

    #[tokio::test]
    async fn test_learn_image_disabled() {
        let tutor = tutor_with(RecordingProvider::replying("x")).with_image_learning(false);
        let result = tutor.learn_image(&png()).await;
        assert!(matches!(result, Err(TutorError::Unsupported(_))));
        assert!(tutor.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_learn_image_failure_leaves_store_empty() {
        let tutor = tutor_with(Arc::new(FailingProvider));
        let err = tutor.learn_image(&png()).await.unwrap_err();
        assert!(err.to_string().starts_with("Error learning from image: "));
        assert!(tutor.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_learn_empty_text_rejected() {
        let tutor = tutor_with(RecordingProvider::replying("x"));
        assert!(matches!(
            tutor.learn_text("").await,
            Err(TutorError::Validation(_))
        ));
    }
}
