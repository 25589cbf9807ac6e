mod provider_e2e;
mod providers;
