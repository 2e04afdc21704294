use std::sync::Arc;
use tokio::sync::mpsc;
use log::{debug, error, info};
use crate::ChefFoot;

/// Public API for the pantrychef backend - owns the task
pub struct ChefBackend
{   hand: crate::ChefHand
  , _task_handle: tokio::task::JoinHandle<()>
}

impl ChefBackend
{   /// Create and spawn a backend talking to Gemini.
    /// Fails before spawning anything if the config has no key.
    pub fn new(
      config: crate::config::ChefConfig
    ) -> Result<Self, crate::error::Error>
    {   let service
          = crate::providers::gemini::GeminiClient::new(config)?;
        Ok(ChefBackend::with_service(Arc::new(service)))
    }

    /// Create and spawn a backend over any content service
    /// Returns immediately - spawns background task
    pub fn with_service(
      service: Arc<dyn crate::providers::ContentService>
    ) -> Self
    {   debug!(
          "Creating ChefBackend over {}",
          service.provider_name()
        );

        let (generate_recipes_tx, generate_recipes_rx)
          = mpsc::unbounded_channel();
        let (kill_process_tx, kill_process_rx)
          = mpsc::unbounded_channel();

        let hand = crate::ChefHand
        {   generate_recipes_tx
          , kill_process_tx
        };

        let foot = crate::ChefFoot
        {   generate_recipes_rx
          , kill_process_rx
        };

        let _task_handle = tokio::spawn(async move {
          run_backend_loop(foot, service).await
        });

        ChefBackend
        {   hand
          , _task_handle
        }
    }

    /// Queue a recipe generation - returns almost immediately.
    /// Drop the receiver to discard the result; requests already in
    /// flight are not cancelled.
    pub async fn generate_recipes(
      &self
    , request: crate::GenerationRequest
    ) -> Result<
        mpsc::UnboundedReceiver<crate::GenerateRecipesReply>,
        crate::error::Error
      >
    {   debug!(
          "generate_recipes queuing {} ingredients",
          request.ingredients.len()
        );
        let (reply_tx, reply_rx)
          = mpsc::unbounded_channel();

        let cmd = crate::GenerateRecipesArgs
        {   request
          , reply: reply_tx
        };

        self.hand.generate_recipes_tx
          .send(cmd)
          .map_err(|_| {
            error!("Backend channel closed");
            crate::error::Error::Other(
              "Backend disconnected".to_string()
            )
          })?;

        Ok(reply_rx)
    }

    /// Gracefully shutdown the backend
    pub async fn shutdown(self)
      -> Result<(), crate::error::Error>
    {   debug!("Shutting down ChefBackend");
        let (reply_tx, mut reply_rx)
          = mpsc::unbounded_channel();

        let cmd = crate::KillProcessArgs
        {   reply: reply_tx
        };

        self.hand.kill_process_tx
          .send(cmd)
          .map_err(|_| {
            error!("Backend channel already closed");
            crate::error::Error::Other(
              "Backend already shutdown".to_string()
            )
          })?;

        // Wait for shutdown confirmation
        if let Some(result) = reply_rx.recv().await
        {   debug!("Backend shutdown confirmed");
            result
        } else
        {   error!("Backend shutdown timeout");
            Err(crate::error::Error::Timeout)
        }
    }
}

/// Main backend event loop
///
/// tokio::select! only routes. Every generation runs in its own task
/// so concurrent requests never wait on each other.
async fn run_backend_loop(
  foot: crate::ChefFoot
, service: Arc<dyn crate::providers::ContentService>
)
{   debug!("Starting ChefBackend event loop");
    let ChefFoot
    {   mut generate_recipes_rx
      , mut kill_process_rx
    } = foot;

    loop
    { tokio::select!
      { Some(cmd) = generate_recipes_rx.recv() => {
          debug!("Received GenerateRecipes");
          let service = Arc::clone(&service);
          tokio::spawn(async move {
            let result = crate::orchestrator::generate_recipes(
              service.as_ref(),
              &cmd.request
            ).await;
            let _ = cmd.reply.send(result);
          });
        }
      , Some(cmd) = kill_process_rx.recv() => {
          debug!("Received KillProcess");
          let _ = cmd.reply.send(Ok(()));
          info!("ChefBackend shutting down");
          break;
        }
      , else => {
          debug!("All backend channels closed");
          break;
        }
      }
    }
}
